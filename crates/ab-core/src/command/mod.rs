//! Named commands understood by the host application object.

mod path_name;
mod relaunch;

pub use path_name::PathName;
pub use relaunch::RelaunchOptions;

pub const QUIT: &str = "quit";
pub const EXIT: &str = "exit";
pub const RELAUNCH: &str = "relaunch";
pub const FOCUS: &str = "focus";
pub const HIDE: &str = "hide";
pub const SHOW: &str = "show";
pub const GET_APP_PATH: &str = "getAppPath";
pub const GET_PATH: &str = "getPath";
pub const SET_PATH: &str = "setPath";
pub const GET_VERSION: &str = "getVersion";
pub const GET_NAME: &str = "getName";
pub const SET_NAME: &str = "setName";
pub const GET_LOCALE: &str = "getLocale";
pub const APPEND_SWITCH: &str = "commandLine.appendSwitch";
pub const APPEND_ARGUMENT: &str = "commandLine.appendArgument";
