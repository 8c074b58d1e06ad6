//! Asset class definitions.

use std::fmt;

/// Logical asset class. Each class owns a source pattern, an output
/// directory, a watch pattern and one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AssetClass {
    Markup,
    Scripts,
    /// Plain CSS, concatenated.
    Styles,
    /// Sass entry, compiled.
    Scss,
    Images,
    Fonts,
}

impl AssetClass {
    pub const ALL: [Self; 6] = [
        Self::Markup,
        Self::Scripts,
        Self::Styles,
        Self::Scss,
        Self::Images,
        Self::Fonts,
    ];

    /// Short name used for CLI commands, log prefixes and config keys.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Scripts => "js",
            Self::Styles => "css",
            Self::Scss => "scss",
            Self::Images => "img",
            Self::Fonts => "fonts",
        }
    }

    /// Label shown in failure notifications.
    pub const fn title(self) -> &'static str {
        match self {
            Self::Markup => "HTML",
            Self::Scripts => "JavaScript",
            Self::Styles => "CSS",
            Self::Scss => "SCSS",
            Self::Images => "Images",
            Self::Fonts => "Fonts",
        }
    }

    /// Both stylesheet variants write the same `style.css`.
    pub const fn is_stylesheet(self) -> bool {
        matches!(self, Self::Styles | Self::Scss)
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
