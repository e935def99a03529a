//! Browser detection and install guidance.

use std::path::PathBuf;

/// Known Chromium-based browser executable names to search for on PATH.
/// All of these speak CDP (Chrome DevTools Protocol).
const CHROMIUM_EXECUTABLES: &[&str] = &[
    "chrome",
    "chrome-browser",
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "msedge",
    "microsoft-edge",
    "microsoft-edge-stable",
    "brave",
    "brave-browser",
    "opera",
    "vivaldi",
    "vivaldi-stable",
];

#[cfg(target_os = "macos")]
fn platform_install_paths() -> &'static [&'static str] {
    &[
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        "/Applications/Microsoft Edge.app/Contents/MacOS/Microsoft Edge",
        "/Applications/Brave Browser.app/Contents/MacOS/Brave Browser",
        "/Applications/Opera.app/Contents/MacOS/Opera",
        "/Applications/Vivaldi.app/Contents/MacOS/Vivaldi",
        "/Applications/Arc.app/Contents/MacOS/Arc",
    ]
}

#[cfg(target_os = "windows")]
fn platform_install_paths() -> &'static [&'static str] {
    &[
        r"C:\Program Files\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
        r"C:\Program Files (x86)\Microsoft\Edge\Application\msedge.exe",
        r"C:\Program Files\BraveSoftware\Brave-Browser\Application\brave.exe",
    ]
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_install_paths() -> &'static [&'static str] {
    &[]
}

/// Locate a Chromium-based browser executable.
///
/// Checks, in order: the configured path, the `CHROME` environment variable,
/// fixed platform install locations, then executable names on PATH. Fixed
/// locations are preferred over PATH because PATH can hold broken wrapper
/// scripts (e.g. Homebrew's deprecated chromium).
#[must_use]
pub fn find_browser(custom_path: Option<&str>) -> Option<PathBuf> {
    if let Some(p) = custom_path.map(PathBuf::from).filter(|p| p.exists()) {
        return Some(p);
    }

    if let Some(p) = std::env::var_os("CHROME")
        .map(PathBuf::from)
        .filter(|p| p.exists())
    {
        return Some(p);
    }

    if let Some(p) = platform_install_paths()
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    {
        return Some(p);
    }

    CHROMIUM_EXECUTABLES
        .iter()
        .find_map(|name| which::which(name).ok())
}

/// Platform-specific install instructions, shown when no browser was found.
#[must_use]
pub fn install_instructions() -> String {
    let instructions = if cfg!(target_os = "macos") {
        "  brew install --cask google-chrome\n  \
         # Alternatives: chromium, brave-browser, microsoft-edge"
    } else if cfg!(target_os = "linux") {
        "  Debian/Ubuntu: sudo apt install chromium-browser\n  \
         Fedora:         sudo dnf install chromium\n  \
         Arch:           sudo pacman -S chromium\n  \
         # Alternatives: brave-browser, microsoft-edge-stable"
    } else if cfg!(target_os = "windows") {
        "  winget install Google.Chrome\n  \
         # Alternatives: Microsoft.Edge, Brave.Brave"
    } else {
        "  Download from https://www.google.com/chrome/"
    };

    format!(
        "No Chromium-based browser found. Install one:\n\n\
         {instructions}\n\n\
         Any Chromium-based browser works (Chrome, Chromium, Edge, Brave, Opera, Vivaldi).\n\n\
         Or set the path manually:\n  \
         [render]\n  \
         chrome_path = \"/path/to/browser\"\n\n\
         Or set the CHROME environment variable."
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn install_instructions_not_empty() {
        let hint = install_instructions();
        assert!(!hint.is_empty());
        assert!(hint.contains("Chrome"));
    }

    #[test]
    fn install_instructions_platform_specific() {
        let hint = install_instructions();

        #[cfg(target_os = "macos")]
        assert!(hint.contains("brew"));

        #[cfg(target_os = "linux")]
        assert!(hint.contains("apt") || hint.contains("dnf") || hint.contains("pacman"));

        #[cfg(target_os = "windows")]
        assert!(hint.contains("winget"));
    }

    #[test]
    fn invalid_custom_path_is_never_returned() {
        let bogus = "/nonexistent/path/to/chrome";
        let found = find_browser(Some(bogus));
        // Detection may still succeed via the system browser, but never with
        // the bogus path itself.
        assert!(found.as_deref() != Some(std::path::Path::new(bogus)));
    }

    #[test]
    fn custom_path_takes_precedence() {
        let temp_dir = std::env::temp_dir();
        let fake_browser = temp_dir.join("fake-chrome-for-argus-test");
        std::fs::write(&fake_browser, "fake").unwrap();

        let found = find_browser(fake_browser.to_str());
        assert_eq!(found.as_ref(), Some(&fake_browser));

        std::fs::remove_file(&fake_browser).unwrap();
    }

    #[test]
    fn chromium_executables_list_covers_the_basics() {
        assert!(CHROMIUM_EXECUTABLES.contains(&"chrome"));
        assert!(CHROMIUM_EXECUTABLES.contains(&"chromium"));
    }
}
