/// Per-operation conversion settings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Convert `fields.js` sources before upload.
    pub enabled: bool,
    /// Option string handed to the script's exported function.
    pub field_options: String,
    /// Copy each produced document next to its source as
    /// `fields.output.json`.
    pub save_output: bool,
}

impl ConvertOptions {
    /// Conversion switched on with no field options.
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    /// Sets the option string.
    pub fn with_field_options(mut self, field_options: impl Into<String>) -> Self {
        self.field_options = field_options.into();
        self
    }

    /// Enables or disables saving the output next to the source.
    pub fn with_save_output(mut self, save_output: bool) -> Self {
        self.save_output = save_output;
        self
    }
}
