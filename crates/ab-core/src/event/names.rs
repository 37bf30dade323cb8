pub const WILL_FINISH_LAUNCHING: &str = "will-finish-launching";
pub const READY: &str = "ready";
pub const WINDOW_ALL_CLOSED: &str = "window-all-closed";
pub const BEFORE_QUIT: &str = "before-quit";
pub const WILL_QUIT: &str = "will-quit";
pub const QUIT: &str = "quit";
pub const OPEN_FILE: &str = "open-file";
pub const OPEN_URL: &str = "open-url";
pub const ACTIVATE: &str = "activate";
pub const BROWSER_WINDOW_BLUR: &str = "browser-window-blur";
pub const BROWSER_WINDOW_FOCUS: &str = "browser-window-focus";
pub const BROWSER_WINDOW_CREATED: &str = "browser-window-created";
pub const WEB_CONTENTS_CREATED: &str = "web-contents-created";
pub const CERTIFICATE_ERROR: &str = "certificate-error";
pub const SELECT_CLIENT_CERTIFICATE: &str = "select-client-certificate";
pub const LOGIN: &str = "login";
pub const GPU_PROCESS_CRASHED: &str = "gpu-process-crashed";
pub const ACCESSIBILITY_SUPPORT_CHANGED: &str = "accessibility-support-changed";

pub const KNOWN_EVENTS: &[&str] = &[
    WILL_FINISH_LAUNCHING,
    READY,
    WINDOW_ALL_CLOSED,
    BEFORE_QUIT,
    WILL_QUIT,
    QUIT,
    OPEN_FILE,
    OPEN_URL,
    ACTIVATE,
    BROWSER_WINDOW_BLUR,
    BROWSER_WINDOW_FOCUS,
    BROWSER_WINDOW_CREATED,
    WEB_CONTENTS_CREATED,
    CERTIFICATE_ERROR,
    SELECT_CLIENT_CERTIFICATE,
    LOGIN,
    GPU_PROCESS_CRASHED,
    ACCESSIBILITY_SUPPORT_CHANGED,
];
