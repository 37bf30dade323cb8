use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use ab_core::command as cmd;
use ab_core::event as evt;
use ab_core::ports::{HostCommandPort, HostRejection};
use ab_core::{Event, PathName, RelaunchOptions};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// What the host pushes into the dispatch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    Event(Event),
    /// Terminate the loop with this exit code.
    Exit(i32),
}

pub type HostMessageSender = mpsc::UnboundedSender<HostMessage>;
pub type HostMessageReceiver = mpsc::UnboundedReceiver<HostMessage>;

pub fn host_message_channel() -> (HostMessageSender, HostMessageReceiver) {
    mpsc::unbounded_channel()
}

#[derive(Debug, Default)]
struct HostState {
    name: String,
    version: String,
    path_overrides: HashMap<PathName, PathBuf>,
    switches: Vec<(String, Option<String>)>,
    arguments: Vec<String>,
    relaunches: Vec<RelaunchOptions>,
    visible: bool,
    quitting: bool,
}

/// Host application object for processes without a windowing runtime.
///
/// Commands are answered synchronously. Lifecycle events it originates are
/// pushed into a [`HostMessage`] channel and reach listeners through the
/// dispatch loop, never from inside `invoke`.
pub struct HeadlessHost {
    state: Mutex<HostState>,
    messages: HostMessageSender,
}

impl HeadlessHost {
    pub fn new(name: &str, version: &str, messages: HostMessageSender) -> Self {
        Self {
            state: Mutex::new(HostState {
                name: name.to_string(),
                version: version.to_string(),
                visible: true,
                ..HostState::default()
            }),
            messages,
        }
    }

    /// Emit the startup events.
    pub fn start(&self) {
        self.post(HostMessage::Event(Event::bare(evt::WILL_FINISH_LAUNCHING)));
        self.post(HostMessage::Event(Event::bare(evt::READY)));
    }

    /// Relaunches requested so far, in call order.
    pub fn take_relaunches(&self) -> Vec<RelaunchOptions> {
        std::mem::take(&mut self.state().relaunches)
    }

    pub fn switches(&self) -> Vec<(String, Option<String>)> {
        self.state().switches.clone()
    }

    pub fn arguments(&self) -> Vec<String> {
        self.state().arguments.clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    fn state(&self) -> MutexGuard<'_, HostState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn post(&self, message: HostMessage) {
        if self.messages.send(message).is_err() {
            debug!("Dispatch loop gone, dropping host message");
        }
    }

    fn quit(&self) {
        {
            let mut state = self.state();
            if state.quitting {
                return;
            }
            state.quitting = true;
        }
        info!("Quit requested");
        for name in [evt::BEFORE_QUIT, evt::WILL_QUIT] {
            self.post(HostMessage::Event(Event::bare(name)));
        }
        self.post(HostMessage::Event(Event::new(evt::QUIT, vec![json!(0)])));
        self.post(HostMessage::Exit(0));
    }

    fn exit(&self, code: i32) {
        info!(code, "Exit requested");
        self.state().quitting = true;
        self.post(HostMessage::Exit(code));
    }

    fn relaunch(&self, args: &[Value]) -> Result<(), HostRejection> {
        let options = match args.first() {
            None | Some(Value::Null) => RelaunchOptions::default(),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|err| HostRejection::new(format!("invalid relaunch options: {err}")))?,
        };
        debug!(?options, "Relaunch scheduled for exit");
        self.state().relaunches.push(options);
        Ok(())
    }

    fn get_path(&self, name: PathName) -> Result<PathBuf, HostRejection> {
        if let Some(path) = self.state().path_overrides.get(&name) {
            return Ok(path.clone());
        }
        let resolved = match name {
            PathName::Home => dirs::home_dir(),
            PathName::AppData => dirs::config_dir(),
            PathName::UserData => {
                let name = self.state().name.clone();
                self.get_path(PathName::AppData)
                    .ok()
                    .map(|app_data| app_data.join(name))
            }
            PathName::Temp => Some(std::env::temp_dir()),
            PathName::Exe | PathName::Module => std::env::current_exe().ok(),
            PathName::Desktop => dirs::desktop_dir(),
            PathName::Documents => dirs::document_dir(),
            PathName::Downloads => dirs::download_dir(),
            PathName::Music => dirs::audio_dir(),
            PathName::Pictures => dirs::picture_dir(),
            PathName::Videos => dirs::video_dir(),
            PathName::PepperFlashSystemPlugin => None,
        };
        resolved.ok_or_else(|| {
            HostRejection::new(format!("path '{}' is not available on this system", name.as_str()))
        })
    }

    /// Missing directories are created.
    fn set_path(&self, name: PathName, path: &Path) -> Result<(), HostRejection> {
        std::fs::create_dir_all(path).map_err(|err| {
            HostRejection::new(format!(
                "failed to create directory '{}': {err}",
                path.display()
            ))
        })?;
        self.state().path_overrides.insert(name, path.to_path_buf());
        Ok(())
    }
}

impl HostCommandPort for HeadlessHost {
    fn invoke(&self, command: &str, args: &[Value]) -> Result<Value, HostRejection> {
        match command {
            cmd::QUIT => {
                self.quit();
                Ok(Value::Null)
            }
            cmd::EXIT => {
                let code = match args.first() {
                    None | Some(Value::Null) => 0,
                    Some(value) => value
                        .as_i64()
                        .and_then(|code| i32::try_from(code).ok())
                        .ok_or_else(|| HostRejection::new("exit code must be an integer"))?,
                };
                self.exit(code);
                Ok(Value::Null)
            }
            cmd::RELAUNCH => self.relaunch(args).map(|_| Value::Null),
            cmd::FOCUS => {
                debug!("Focus requested");
                self.state().visible = true;
                Ok(Value::Null)
            }
            cmd::HIDE => {
                self.state().visible = false;
                Ok(Value::Null)
            }
            cmd::SHOW => {
                self.state().visible = true;
                Ok(Value::Null)
            }
            cmd::GET_APP_PATH => {
                let exe = std::env::current_exe()
                    .map_err(|err| HostRejection::new(format!("app path unavailable: {err}")))?;
                let dir = exe.parent().map(Path::to_path_buf).unwrap_or(exe);
                Ok(json!(dir.to_string_lossy()))
            }
            cmd::GET_PATH => {
                let name = path_name_arg(args, 0)?;
                Ok(json!(self.get_path(name)?.to_string_lossy()))
            }
            cmd::SET_PATH => {
                let name = path_name_arg(args, 0)?;
                let path = string_arg(args, 1)?;
                self.set_path(name, Path::new(path))?;
                Ok(Value::Null)
            }
            cmd::GET_VERSION => Ok(json!(self.state().version)),
            cmd::GET_NAME => Ok(json!(self.state().name)),
            cmd::SET_NAME => {
                let name = string_arg(args, 0)?;
                self.state().name = name.to_string();
                Ok(Value::Null)
            }
            cmd::GET_LOCALE => Ok(json!(current_locale())),
            cmd::APPEND_SWITCH => {
                let switch = string_arg(args, 0)?;
                let value = args.get(1).and_then(Value::as_str).map(str::to_string);
                self.state().switches.push((switch.to_string(), value));
                Ok(Value::Null)
            }
            cmd::APPEND_ARGUMENT => {
                let value = string_arg(args, 0)?;
                self.state().arguments.push(value.to_string());
                Ok(Value::Null)
            }
            other => Err(HostRejection::new(format!("unknown command '{other}'"))),
        }
    }
}

fn string_arg(args: &[Value], index: usize) -> Result<&str, HostRejection> {
    args.get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| HostRejection::new(format!("argument {index} must be a string")))
}

fn path_name_arg(args: &[Value], index: usize) -> Result<PathName, HostRejection> {
    let raw = string_arg(args, index)?;
    PathName::parse(raw).ok_or_else(|| HostRejection::new(format!("unknown path name '{raw}'")))
}

/// BCP 47 tag from the POSIX locale environment, `en-US` when unset.
fn current_locale() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| locale_tag(&value))
        .unwrap_or_else(|| "en-US".to_string())
}

fn locale_tag(posix: &str) -> Option<String> {
    let base = posix.split(['.', '@']).next().unwrap_or_default();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return None;
    }
    Some(base.replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> (HeadlessHost, HostMessageReceiver) {
        let (tx, rx) = host_message_channel();
        (HeadlessHost::new("demo", "1.0.0", tx), rx)
    }

    fn drain(rx: &mut HostMessageReceiver) -> Vec<HostMessage> {
        let mut messages = Vec::new();
        while let Ok(message) = rx.try_recv() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn quit_emits_quit_sequence_then_exit() {
        let (host, mut rx) = host();
        host.invoke(cmd::QUIT, &[]).unwrap();
        host.invoke(cmd::QUIT, &[]).unwrap();

        assert_eq!(
            drain(&mut rx),
            vec![
                HostMessage::Event(Event::bare(evt::BEFORE_QUIT)),
                HostMessage::Event(Event::bare(evt::WILL_QUIT)),
                HostMessage::Event(Event::new(evt::QUIT, vec![json!(0)])),
                HostMessage::Exit(0),
            ]
        );
    }

    #[test]
    fn exit_skips_quit_events() {
        let (host, mut rx) = host();
        host.invoke(cmd::EXIT, &[json!(3)]).unwrap();
        assert_eq!(drain(&mut rx), vec![HostMessage::Exit(3)]);
    }

    #[test]
    fn exit_rejects_non_integer_code() {
        let (host, _rx) = host();
        assert!(host.invoke(cmd::EXIT, &[json!("soon")]).is_err());
    }

    #[test]
    fn name_round_trips() {
        let (host, _rx) = host();
        assert_eq!(host.invoke(cmd::GET_NAME, &[]).unwrap(), json!("demo"));
        host.invoke(cmd::SET_NAME, &[json!("renamed")]).unwrap();
        assert_eq!(host.invoke(cmd::GET_NAME, &[]).unwrap(), json!("renamed"));
        assert_eq!(host.invoke(cmd::GET_VERSION, &[]).unwrap(), json!("1.0.0"));
    }

    #[test]
    fn set_path_overrides_get_path() {
        let (host, _rx) = host();
        let dir = tempfile::TempDir::new().unwrap();
        let dir_str = dir.path().to_string_lossy().to_string();

        host.invoke(cmd::SET_PATH, &[json!("userData"), json!(dir_str)])
            .unwrap();
        assert_eq!(
            host.invoke(cmd::GET_PATH, &[json!("userData")]).unwrap(),
            json!(dir_str)
        );
    }

    #[test]
    fn set_path_creates_missing_directory() {
        let (host, _rx) = host();
        let dir = tempfile::TempDir::new().unwrap();
        let target = dir.path().join("new-user-data").join("nested");
        let target_str = target.to_string_lossy().to_string();

        host.invoke(cmd::SET_PATH, &[json!("userData"), json!(target_str)])
            .unwrap();

        assert!(target.is_dir());
        assert_eq!(
            host.invoke(cmd::GET_PATH, &[json!("userData")]).unwrap(),
            json!(target_str)
        );
    }

    #[test]
    fn set_path_reports_uncreatable_directory() {
        let (host, _rx) = host();
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("plain-file");
        std::fs::write(&file, b"x").unwrap();
        let below_file = file.join("child").to_string_lossy().to_string();

        let err = host
            .invoke(cmd::SET_PATH, &[json!("userData"), json!(below_file)])
            .unwrap_err();
        assert!(err.message.starts_with("failed to create directory"));
    }

    #[test]
    fn unknown_path_name_is_rejected() {
        let (host, _rx) = host();
        let err = host.invoke(cmd::GET_PATH, &[json!("attic")]).unwrap_err();
        assert_eq!(err.message, "unknown path name 'attic'");
    }

    #[test]
    fn temp_path_resolves() {
        let (host, _rx) = host();
        let temp = host.invoke(cmd::GET_PATH, &[json!("temp")]).unwrap();
        assert_eq!(temp, json!(std::env::temp_dir().to_string_lossy()));
    }

    #[test]
    fn relaunch_requests_are_recorded_in_order() {
        let (host, _rx) = host();
        host.invoke(cmd::RELAUNCH, &[]).unwrap();
        host.invoke(
            cmd::RELAUNCH,
            &[json!({ "args": ["--safe"], "execPath": "/opt/demo" })],
        )
        .unwrap();

        let relaunches = host.take_relaunches();
        assert_eq!(relaunches.len(), 2);
        assert_eq!(relaunches[0], RelaunchOptions::default());
        assert_eq!(relaunches[1].args, Some(vec!["--safe".to_string()]));
        assert_eq!(relaunches[1].exec_path, Some(PathBuf::from("/opt/demo")));
        assert!(host.take_relaunches().is_empty());
    }

    #[test]
    fn command_line_switches_are_recorded() {
        let (host, _rx) = host();
        host.invoke(cmd::APPEND_SWITCH, &[json!("disable-gpu")]).unwrap();
        host.invoke(cmd::APPEND_SWITCH, &[json!("lang"), json!("de")])
            .unwrap();
        host.invoke(cmd::APPEND_ARGUMENT, &[json!("--trace")]).unwrap();

        assert_eq!(
            host.switches(),
            vec![
                ("disable-gpu".to_string(), None),
                ("lang".to_string(), Some("de".to_string())),
            ]
        );
        assert_eq!(host.arguments(), vec!["--trace".to_string()]);
    }

    #[test]
    fn hide_and_show_toggle_visibility() {
        let (host, _rx) = host();
        host.invoke(cmd::HIDE, &[]).unwrap();
        assert!(!host.is_visible());
        host.invoke(cmd::FOCUS, &[]).unwrap();
        assert!(host.is_visible());
    }

    #[test]
    fn unknown_commands_are_rejected() {
        let (host, _rx) = host();
        let err = host.invoke("teleport", &[]).unwrap_err();
        assert_eq!(err.message, "unknown command 'teleport'");
    }

    #[test]
    fn locale_tags_follow_bcp47() {
        assert_eq!(locale_tag("de_DE.UTF-8").as_deref(), Some("de-DE"));
        assert_eq!(locale_tag("fr_FR@euro").as_deref(), Some("fr-FR"));
        assert_eq!(locale_tag("C"), None);
        assert_eq!(locale_tag(""), None);
    }
}
