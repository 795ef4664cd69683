use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use fields::{ConvertOptions, FieldsConverter};
use filters::IgnoreRuleSet;
use remote::{Environment, PublishMode};
use transfer::{DEFAULT_CONCURRENCY, UploadOptions};

use crate::debounce::{ACTIVITY_QUIET_PERIOD, PREVIEW_QUIET_PERIOD};

/// Settings for a watch session.
#[derive(Clone, Debug)]
pub struct WatchOptions {
    /// Publish mode for every upload.
    pub mode: PublishMode,
    /// Target environment.
    pub environment: Environment,
    /// Delete remote counterparts of removed local paths.
    pub remove: bool,
    /// Skip the initial upload of the whole tree.
    pub disable_initial: bool,
    /// Fields conversion settings.
    pub convert: ConvertOptions,
    /// Converter used for convertible sources.
    pub converter: FieldsConverter,
    /// Ignore rules. Defaults to rules discovered from the watched root.
    pub ignore: Option<Arc<IgnoreRuleSet>>,
    /// Whether the session runs inside a project.
    pub in_project: bool,
    /// File the debounced activity blocks are appended to.
    pub activity_log: Option<PathBuf>,
    /// Quiet period of the activity log.
    pub activity_quiet: Duration,
    /// Quiet period of the theme preview notice.
    pub preview_quiet: Duration,
    /// Queue concurrency ceiling.
    pub concurrency: usize,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            mode: PublishMode::default(),
            environment: Environment::default(),
            remove: false,
            disable_initial: false,
            convert: ConvertOptions::default(),
            converter: FieldsConverter::default(),
            ignore: None,
            in_project: false,
            activity_log: None,
            activity_quiet: ACTIVITY_QUIET_PERIOD,
            preview_quiet: PREVIEW_QUIET_PERIOD,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

impl WatchOptions {
    /// Sets the publish mode.
    pub fn with_mode(mut self, mode: PublishMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the target environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Enables remote deletion on local removal.
    pub fn with_remove(mut self, remove: bool) -> Self {
        self.remove = remove;
        self
    }

    /// Skips the initial upload.
    pub fn with_disable_initial(mut self, disable_initial: bool) -> Self {
        self.disable_initial = disable_initial;
        self
    }

    /// Sets the conversion settings.
    pub fn with_convert(mut self, convert: ConvertOptions) -> Self {
        self.convert = convert;
        self
    }

    /// Sets the converter.
    pub fn with_converter(mut self, converter: FieldsConverter) -> Self {
        self.converter = converter;
        self
    }

    /// Uses `ignore` instead of discovering rules.
    pub fn with_ignore(mut self, ignore: Arc<IgnoreRuleSet>) -> Self {
        self.ignore = Some(ignore);
        self
    }

    /// Marks the session as running inside a project.
    pub fn with_in_project(mut self, in_project: bool) -> Self {
        self.in_project = in_project;
        self
    }

    /// Appends activity blocks to `path`.
    pub fn with_activity_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.activity_log = Some(path.into());
        self
    }

    /// Overrides both quiet periods.
    pub fn with_quiet_periods(mut self, activity: Duration, preview: Duration) -> Self {
        self.activity_quiet = activity;
        self.preview_quiet = preview;
        self
    }

    /// Overrides the concurrency ceiling.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub(crate) fn upload_options(&self, ignore: Arc<IgnoreRuleSet>) -> UploadOptions {
        UploadOptions::default()
            .with_convert(self.convert.clone())
            .with_converter(self.converter.clone())
            .with_environment(self.environment)
            .with_ignore(ignore)
            .with_in_project(self.in_project)
            .with_concurrency(self.concurrency)
    }
}
