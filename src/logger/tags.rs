/// Log tags identifying the subsystem a message comes from

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Pricing,
    Api,
    Refresh,
    Webserver,
    Auth,
    Sessions,
    Notifications,
}

impl LogTag {
    /// Upper-case console label
    pub fn to_plain_string(&self) -> &'static str {
        match self {
            LogTag::System => "SYSTEM",
            LogTag::Config => "CONFIG",
            LogTag::Pricing => "PRICING",
            LogTag::Api => "API",
            LogTag::Refresh => "REFRESH",
            LogTag::Webserver => "WEBSERVER",
            LogTag::Auth => "AUTH",
            LogTag::Sessions => "SESSIONS",
            LogTag::Notifications => "NOTIFY",
        }
    }

    /// Lower-case key used in JSON output
    pub fn to_key(&self) -> &'static str {
        match self {
            LogTag::System => "system",
            LogTag::Config => "config",
            LogTag::Pricing => "pricing",
            LogTag::Api => "api",
            LogTag::Refresh => "refresh",
            LogTag::Webserver => "webserver",
            LogTag::Auth => "auth",
            LogTag::Sessions => "sessions",
            LogTag::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
