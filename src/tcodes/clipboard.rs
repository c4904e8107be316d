use crate::error::{CatalogError, Result};
use std::io::Write;
use std::process::{Command, Stdio};

/// Clipboard programs to try, in order.
/// - macOS: pbcopy
/// - Linux: xclip, then xsel
/// - Windows: clip.exe
#[cfg(target_os = "macos")]
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "linux")]
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[cfg(target_os = "windows")]
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
const CLIPBOARD_PROGRAMS: &[(&str, &[&str])] = &[];

pub fn copy_to_clipboard(text: &str) -> Result<()> {
    if CLIPBOARD_PROGRAMS.is_empty() {
        return Err(CatalogError::Api(
            "Clipboard not supported on this platform".to_string(),
        ));
    }

    let mut failures = Vec::new();
    for (program, args) in CLIPBOARD_PROGRAMS {
        match pipe_into(program, args, text) {
            Ok(()) => return Ok(()),
            Err(e) => failures.push(format!("{}: {}", program, e)),
        }
    }
    Err(CatalogError::Api(format!(
        "Could not copy to clipboard ({})",
        failures.join("; ")
    )))
}

fn pipe_into(program: &str, args: &[&str], text: &str) -> std::io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    let status = child.wait()?;
    if status.success() {
        Ok(())
    } else {
        Err(std::io::Error::other(format!("exited with {}", status)))
    }
}

/// Hands a URL to the desktop's default handler.
pub fn open_url(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = Command::new("xdg-open");

    let status = command
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| CatalogError::Api(format!("Failed to open {}: {}", url, e)))?;

    if status.success() {
        Ok(())
    } else {
        Err(CatalogError::Api(format!("Failed to open {}", url)))
    }
}
