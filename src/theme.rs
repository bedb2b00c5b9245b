//! Theme State
//!
//! Dark/light preference owned by the dashboard. Toggling pushes the new
//! value to every live reader, in order. Not persisted: each process starts
//! light.

use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;

/// Colour theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Mode string handed to the chart renderer
    pub fn mode(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => Palette::LIGHT,
            Theme::Dark => Palette::DARK,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mode())
    }
}

/// Colour set of a theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub text: &'static str,
    pub background: &'static str,
    pub accent: &'static str,
    pub up: &'static str,
    pub down: &'static str,
    pub card_background: &'static str,
}

impl Palette {
    pub const LIGHT: Palette = Palette {
        text: "black",
        background: "whitesmoke",
        accent: "#9c88ff",
        up: "#009432",
        down: "#EA2027",
        card_background: "#fff",
    };

    pub const DARK: Palette = Palette {
        text: "whitesmoke",
        background: "#2f3640",
        accent: "#9c88ff",
        up: "#009432",
        down: "#EA2027",
        card_background: "transparent",
    };
}

/// Owner of the theme preference
#[derive(Debug, Default)]
pub struct ThemeState {
    theme: Theme,
    readers: Vec<mpsc::UnboundedSender<Theme>>,
}

impl ThemeState {
    pub fn new(initial: Theme) -> Self {
        Self {
            theme: initial,
            readers: Vec::new(),
        }
    }

    /// Whether the dark theme is active
    pub fn read(&self) -> bool {
        self.theme.is_dark()
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Flip the theme and notify every reader; returns the new theme
    pub fn toggle(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        let theme = self.theme;
        self.readers.retain(|reader| reader.send(theme).is_ok());
        tracing::debug!(theme = %theme, readers = self.readers.len(), "Theme toggled");
        theme
    }

    /// Register a reader that sees every subsequent toggle
    pub fn subscribe(&mut self) -> ThemeReader {
        let (tx, rx) = mpsc::unbounded_channel();
        self.readers.push(tx);
        ThemeReader {
            current: self.theme,
            rx,
        }
    }

    pub fn reader_count(&self) -> usize {
        self.readers.iter().filter(|r| !r.is_closed()).count()
    }
}

/// Receiving side of a theme subscription
#[derive(Debug)]
pub struct ThemeReader {
    current: Theme,
    rx: mpsc::UnboundedReceiver<Theme>,
}

impl ThemeReader {
    /// Last value this reader observed
    pub fn current(&self) -> Theme {
        self.current
    }

    /// Wait for the next toggle. `None` once the state is gone.
    pub async fn next(&mut self) -> Option<Theme> {
        let theme = self.rx.recv().await?;
        self.current = theme;
        Some(theme)
    }

    /// Next toggle if one is already queued
    pub fn try_next(&mut self) -> Option<Theme> {
        let theme = self.rx.try_recv().ok()?;
        self.current = theme;
        Some(theme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_light() {
        let state = ThemeState::default();
        assert!(!state.read());
        assert_eq!(state.theme(), Theme::Light);
        assert_eq!(state.theme().palette(), Palette::LIGHT);
    }

    #[test]
    fn test_double_toggle_restores() {
        let mut state = ThemeState::default();
        assert_eq!(state.toggle(), Theme::Dark);
        assert!(state.read());
        assert_eq!(state.toggle(), Theme::Light);
        assert!(!state.read());
    }

    #[tokio::test]
    async fn test_readers_see_every_value_in_order() {
        let mut state = ThemeState::default();
        let mut a = state.subscribe();
        let mut b = state.subscribe();

        state.toggle();
        state.toggle();
        state.toggle();

        for reader in [&mut a, &mut b] {
            assert_eq!(reader.next().await, Some(Theme::Dark));
            assert_eq!(reader.next().await, Some(Theme::Light));
            assert_eq!(reader.next().await, Some(Theme::Dark));
            assert_eq!(reader.try_next(), None);
            assert_eq!(reader.current(), Theme::Dark);
        }
    }

    #[test]
    fn test_dropped_readers_pruned() {
        let mut state = ThemeState::default();
        let kept = state.subscribe();
        drop(state.subscribe());
        state.toggle();
        assert_eq!(state.reader_count(), 1);
        assert_eq!(kept.current(), Theme::Light);
    }

    #[test]
    fn test_palettes() {
        assert_eq!(Palette::DARK.background, "#2f3640");
        assert_eq!(Palette::DARK.card_background, "transparent");
        assert_eq!(Palette::LIGHT.text, "black");
        assert_eq!(Palette::LIGHT.accent, Palette::DARK.accent);
    }
}
