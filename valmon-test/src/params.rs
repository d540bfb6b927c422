use valmon_core::{MonitorConfig, SeverityFlags};

// This information determines how a test is monitored and judged.
#[derive(Clone, Debug)]
pub struct TestParameters {
    pub config: MonitorConfig,
    // Test should always fail
    pub always_failure: bool,
}

impl Default for TestParameters {
    fn default() -> Self {
        Self {
            config: MonitorConfig::default().with_env(),
            always_failure: false,
        }
    }
}

// Builder pattern to make it easier
impl TestParameters {
    /// Set the severities whose unmatched diagnostics fail the test.
    pub fn strict(mut self, severities: SeverityFlags) -> Self {
        self.config.strict = severities;
        self
    }

    pub fn bailout(mut self) -> Self {
        self.config.bailout = true;
        self
    }

    /// Don't echo diagnostics to the log.
    pub fn quiet(mut self) -> Self {
        self.config.log_messages = false;
        self
    }

    /// Mark the test as expected to fail.
    pub fn failure(mut self) -> Self {
        self.always_failure = true;
        self
    }
}
