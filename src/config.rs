//! Command-line configuration of the demo.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoConfig {
    pub width: u32,
    pub height: u32,
    pub fullscreen: bool,
    pub verbose: bool,
    /// WAV file whose header is decoded and logged at startup.
    pub wav: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            verbose: false,
            wav: None,
        }
    }
}

impl DemoConfig {
    /// Parses `--size=WxH`, `--fullscreen`, `--verbose` and `--wav=PATH`.
    /// Arguments it does not understand are handed back so they can be
    /// reported once logging is up.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut unknown = Vec::new();
        for arg in args {
            if let Some(size) = arg.strip_prefix("--size=") {
                match size
                    .split_once(['x', 'X'])
                    .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)))
                {
                    Some((w, h)) => (config.width, config.height) = (w, h),
                    None => unknown.push(arg),
                }
            } else if let Some(path) = arg.strip_prefix("--wav=") {
                config.wav = Some(PathBuf::from(path));
            } else if arg == "--fullscreen" {
                config.fullscreen = true;
            } else if arg == "--verbose" || arg == "-v" {
                config.verbose = true;
            } else {
                unknown.push(arg);
            }
        }
        (config, unknown)
    }
}
