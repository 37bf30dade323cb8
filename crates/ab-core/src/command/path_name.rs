use serde::{Deserialize, Serialize};

/// Special directories and files the host can resolve with `getPath`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PathName {
    Home,
    AppData,
    UserData,
    Temp,
    Exe,
    Module,
    Desktop,
    Documents,
    Downloads,
    Music,
    Pictures,
    Videos,
    PepperFlashSystemPlugin,
}

impl PathName {
    pub const ALL: [PathName; 13] = [
        PathName::Home,
        PathName::AppData,
        PathName::UserData,
        PathName::Temp,
        PathName::Exe,
        PathName::Module,
        PathName::Desktop,
        PathName::Documents,
        PathName::Downloads,
        PathName::Music,
        PathName::Pictures,
        PathName::Videos,
        PathName::PepperFlashSystemPlugin,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PathName::Home => "home",
            PathName::AppData => "appData",
            PathName::UserData => "userData",
            PathName::Temp => "temp",
            PathName::Exe => "exe",
            PathName::Module => "module",
            PathName::Desktop => "desktop",
            PathName::Documents => "documents",
            PathName::Downloads => "downloads",
            PathName::Music => "music",
            PathName::Pictures => "pictures",
            PathName::Videos => "videos",
            PathName::PepperFlashSystemPlugin => "pepperFlashSystemPlugin",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl std::fmt::Display for PathName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
