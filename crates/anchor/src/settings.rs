//! Line-oriented `.ini` persistence.
//!
//! ```text
//! [Type][Name]
//! Key=Value
//! ```
//!
//! Each `[Type]` is owned by a registered [`SettingsHandler`]. Sections without a
//! handler are kept as-is and written back unchanged.

use std::any::Any;
use std::fmt::Write as _;
use std::path::Path;

use crate::error::SettingsError;

/// Reads and writes the sections of one `[Type]`.
pub trait SettingsHandler: Any {
    /// The `Type` part of `[Type][Name]` headers.
    fn type_name(&self) -> &str;

    /// Forget everything, called before a load.
    fn clear_all(&mut self) {}

    /// Start reading entry `name`. Returning `false` skips the section.
    fn read_open(&mut self, name: &str) -> bool;

    /// One non-empty line of the current entry.
    fn read_line(&mut self, name: &str, line: &str);

    /// Called once every section of a load has been read.
    fn apply_all(&mut self) {}

    /// Append every entry, headers included.
    fn write_all(&self, out: &mut String);
}

/// Generic `Key=Value` sections, keeping entry and key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyValueSettings {
    type_name: String,
    entries: Vec<(String, Vec<(String, String)>)>,
}

impl KeyValueSettings {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            entries: Vec::new(),
        }
    }

    fn entry_mut(&mut self, name: &str) -> &mut Vec<(String, String)> {
        let idx = match self.entries.iter().position(|(n, _)| n == name) {
            Some(idx) => idx,
            None => {
                self.entries.push((name.to_owned(), Vec::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[idx].1
    }

    pub fn get(&self, name: &str, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, kv)| kv.iter().find(|(k, _)| k == key))
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, name: &str, key: &str, value: impl Into<String>) {
        let value = value.into();
        let kv = self.entry_mut(name);
        match kv.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => kv.push((key.to_owned(), value)),
        }
    }

    pub fn remove_entry(&mut self, name: &str) {
        self.entries.retain(|(n, _)| n != name);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

impl SettingsHandler for KeyValueSettings {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn clear_all(&mut self) {
        self.entries.clear();
    }

    fn read_open(&mut self, name: &str) -> bool {
        self.entry_mut(name);
        true
    }

    fn read_line(&mut self, name: &str, line: &str) {
        if let Some((key, value)) = line.split_once('=') {
            self.set(name, key.trim(), value.trim());
        }
    }

    fn write_all(&self, out: &mut String) {
        for (name, kv) in &self.entries {
            let _ = writeln!(out, "[{}][{}]", self.type_name, name);
            for (key, value) in kv {
                let _ = writeln!(out, "{key}={value}");
            }
            out.push('\n');
        }
    }
}

/// A section nobody claimed, kept verbatim.
#[derive(Debug, Clone, PartialEq)]
struct RawSection {
    type_name: String,
    name: String,
    lines: Vec<String>,
}

/// Registered handlers plus the dirty/save timer.
#[derive(Default)]
pub struct SettingsStore {
    handlers: Vec<Box<dyn SettingsHandler>>,
    unclaimed: Vec<RawSection>,
    dirty_timer: Option<f32>,
    loaded: bool,
}

impl std::fmt::Debug for SettingsStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsStore")
            .field(
                "handlers",
                &self.handlers.iter().map(|h| h.type_name().to_owned()).collect::<Vec<_>>(),
            )
            .field("unclaimed", &self.unclaimed.len())
            .field("dirty_timer", &self.dirty_timer)
            .field("loaded", &self.loaded)
            .finish()
    }
}

/// Split `[Type][Name]`. The name may itself contain brackets.
fn parse_header(line: &str) -> Option<(&str, &str)> {
    let rest = line.strip_prefix('[')?.strip_suffix(']')?;
    let (type_name, name) = rest.split_once(']')?;
    let name = name.strip_prefix('[')?;
    Some((type_name, name))
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler. A second handler for the same type replaces the first.
    pub fn add_handler(&mut self, handler: Box<dyn SettingsHandler>) {
        self.handlers.retain(|h| h.type_name() != handler.type_name());
        self.handlers.push(handler);
    }

    pub fn handler<H: SettingsHandler>(&self) -> Option<&H> {
        self.handlers
            .iter()
            .find_map(|h| (h.as_ref() as &dyn Any).downcast_ref::<H>())
    }

    pub fn handler_mut<H: SettingsHandler>(&mut self) -> Option<&mut H> {
        self.handlers
            .iter_mut()
            .find_map(|h| (h.as_mut() as &mut dyn Any).downcast_mut::<H>())
    }

    /// Whether a load has happened (successfully or from an absent file).
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub(crate) fn set_loaded(&mut self) {
        self.loaded = true;
    }

    /// Parse `.ini` text, replacing everything the handlers currently hold.
    pub fn load_from_memory(&mut self, text: &str) -> Result<(), SettingsError> {
        for handler in &mut self.handlers {
            handler.clear_all();
        }
        self.unclaimed.clear();

        enum Target {
            Handler(usize, String),
            Raw(usize),
            Skip,
        }
        let mut target = Target::Skip;

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
                continue;
            }
            if line.starts_with('[') {
                let (type_name, name) = parse_header(line).ok_or_else(|| SettingsError::BadHeader {
                    line: line_no + 1,
                    text: line.to_owned(),
                })?;
                let owner = self.handlers.iter().position(|h| h.type_name() == type_name);
                target = match owner {
                    Some(i) if self.handlers[i].read_open(name) => Target::Handler(i, name.to_owned()),
                    Some(_) => Target::Skip,
                    None => {
                        self.unclaimed.push(RawSection {
                            type_name: type_name.to_owned(),
                            name: name.to_owned(),
                            lines: Vec::new(),
                        });
                        Target::Raw(self.unclaimed.len() - 1)
                    }
                };
                continue;
            }
            match &target {
                Target::Handler(i, name) => self.handlers[*i].read_line(name, line),
                Target::Raw(i) => self.unclaimed[*i].lines.push(line.to_owned()),
                Target::Skip => {}
            }
        }

        for handler in &mut self.handlers {
            handler.apply_all();
        }
        self.loaded = true;
        self.dirty_timer = None;
        Ok(())
    }

    /// Serialize every handler, then the unclaimed sections. Clears the dirty flag.
    pub fn save_to_memory(&mut self) -> String {
        let mut out = String::new();
        for handler in &self.handlers {
            handler.write_all(&mut out);
        }
        for section in &self.unclaimed {
            let _ = writeln!(out, "[{}][{}]", section.type_name, section.name);
            for line in &section.lines {
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }
        self.dirty_timer = None;
        out
    }

    /// Load from `path`. A missing file is not an error.
    pub fn load_from_disk(&mut self, path: &Path) -> Result<(), SettingsError> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                log::info!("Loading settings from {}", path.display());
                self.load_from_memory(&text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No settings file at {}", path.display());
                self.loaded = true;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to_disk(&mut self, path: &Path) -> Result<(), SettingsError> {
        let text = self.save_to_memory();
        std::fs::write(path, text)?;
        log::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Schedule a save `saving_rate` seconds from now, unless one is already pending.
    pub fn mark_dirty(&mut self, saving_rate: f32) {
        if self.dirty_timer.is_none() {
            self.dirty_timer = Some(saving_rate);
        }
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty_timer.is_some()
    }

    /// Advance the save timer. Returns `true` once a pending save is due.
    pub fn update(&mut self, delta_time: f32) -> bool {
        match &mut self.dirty_timer {
            Some(timer) => {
                *timer -= delta_time;
                *timer <= 0.0
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[Window][Debug##Default]
Pos=60,60
Size=400,400
Collapsed=0

[Window][Tools [beta]]
Pos=10,20

[Table][0x1234ABCD,4]
Column 0=Width=100

";

    fn store() -> SettingsStore {
        let mut store = SettingsStore::new();
        store.add_handler(Box::new(KeyValueSettings::new("Window")));
        store
    }

    #[test]
    fn test_round_trip_preserves_all_sections() {
        let mut s = store();
        s.load_from_memory(SAMPLE).unwrap();
        let saved = s.save_to_memory();
        assert_eq!(saved, SAMPLE);

        let mut again = store();
        again.load_from_memory(&saved).unwrap();
        assert_eq!(again.save_to_memory(), saved);
    }

    #[test]
    fn test_handler_sees_values() {
        let mut s = store();
        s.load_from_memory(SAMPLE).unwrap();
        let windows = s.handler::<KeyValueSettings>().unwrap();
        assert_eq!(windows.get("Debug##Default", "Size"), Some("400,400"));
        assert_eq!(windows.get("Tools [beta]", "Pos"), Some("10,20"));
        assert_eq!(windows.names().count(), 2);
    }

    #[test]
    fn test_edits_show_up_in_save() {
        let mut s = store();
        s.load_from_memory(SAMPLE).unwrap();
        let windows = s.handler_mut::<KeyValueSettings>().unwrap();
        windows.set("Debug##Default", "Collapsed", "1");
        windows.set("New", "Pos", "0,0");
        let saved = s.save_to_memory();
        assert!(saved.contains("Collapsed=1"));
        assert!(saved.contains("[Window][New]\nPos=0,0\n"));
    }

    #[test]
    fn test_bad_header_reports_line() {
        let mut s = store();
        let err = s.load_from_memory("\n[Window]\nPos=1,1\n").unwrap_err();
        assert!(matches!(err, SettingsError::BadHeader { line: 2, .. }));
    }

    #[test]
    fn test_load_clears_previous_state() {
        let mut s = store();
        s.load_from_memory(SAMPLE).unwrap();
        s.load_from_memory("[Window][Only]\nPos=1,2\n").unwrap();
        assert_eq!(s.save_to_memory(), "[Window][Only]\nPos=1,2\n\n");
    }

    #[test]
    fn test_dirty_timer() {
        let mut s = store();
        assert!(!s.update(1.0));
        s.mark_dirty(5.0);
        s.mark_dirty(1.0);
        assert!(!s.update(4.0));
        assert!(s.update(1.0));
        s.save_to_memory();
        assert!(!s.is_dirty());
    }

    #[test]
    fn test_disk_round_trip() {
        let path = std::env::temp_dir().join(format!("anchor-settings-{}.ini", std::process::id()));
        let mut s = store();
        s.load_from_memory(SAMPLE).unwrap();
        s.save_to_disk(&path).unwrap();

        let mut loaded = store();
        loaded.load_from_disk(&path).unwrap();
        assert_eq!(loaded.save_to_memory(), SAMPLE);
        let _ = std::fs::remove_file(&path);

        let mut missing = store();
        missing.load_from_disk(&path).unwrap();
        assert!(missing.is_loaded());
    }
}
