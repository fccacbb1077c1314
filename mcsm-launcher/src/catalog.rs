//! The game packages the launcher knows how to install.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::manager::normalize::{season_two_strategies, NormalizationStrategy};

/// Download URL of the Season One package.
pub const SEASON_ONE_URL: &str =
    "https://archive.org/download/minecraft-story-mode-s1-2/Minecraft%20Story%20Mode%20S1.zip";

/// Download URL of the Season Two package.
pub const SEASON_TWO_URL: &str =
    "https://archive.org/download/minecraft-story-mode-s1-2/Minecraft%20Story%20Mode%20S2.zip";

/// A game season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Season {
    One,
    Two,
}

impl Season {
    /// All known seasons.
    pub const ALL: [Season; 2] = [Season::One, Season::Two];

    /// Human-readable label, e.g. "Season 1".
    pub fn label(&self) -> &'static str {
        match self {
            Self::One => "Season 1",
            Self::Two => "Season 2",
        }
    }

    /// Default package download URL.
    pub fn url(&self) -> &'static str {
        match self {
            Self::One => SEASON_ONE_URL,
            Self::Two => SEASON_TWO_URL,
        }
    }

    /// Name of the executable that marks a complete install.
    pub fn expected_executable(&self) -> &'static str {
        match self {
            Self::One => "MinecraftStoryMode.exe",
            Self::Two => "Minecraft2.exe",
        }
    }

    /// Folder created under the install root.
    pub fn default_folder(&self) -> &'static str {
        match self {
            Self::One => "S1",
            Self::Two => "S2",
        }
    }

    /// Where the game keeps its saves, under the user's documents folder.
    pub fn default_saves_dir(&self) -> Option<PathBuf> {
        dirs::document_dir().map(|docs| docs.join("Telltale Games").join(self.default_folder()))
    }

    /// Layout fix-ups applied after extraction.
    pub fn normalizers(&self) -> Vec<Box<dyn NormalizationStrategy>> {
        match self {
            Self::One => Vec::new(),
            Self::Two => season_two_strategies(),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Season {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "1" | "s1" | "one" | "season1" | "seasonone" => Ok(Self::One),
            "2" | "s2" | "two" | "season2" | "seasontwo" => Ok(Self::Two),
            _ => Err(format!("unknown season '{}', expected 1 or 2", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_season_metadata() {
        assert_eq!(Season::One.expected_executable(), "MinecraftStoryMode.exe");
        assert_eq!(Season::Two.expected_executable(), "Minecraft2.exe");
        assert_eq!(Season::One.default_folder(), "S1");
        assert!(Season::Two.url().ends_with("S2.zip"));
        assert_eq!(Season::One.to_string(), "Season 1");
    }

    #[test]
    fn test_normalizers() {
        assert!(Season::One.normalizers().is_empty());
        let names: Vec<String> = Season::Two
            .normalizers()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["nested-chain", "keyword-search"]);
    }

    #[test]
    fn test_parse_season() {
        assert_eq!("1".parse::<Season>().unwrap(), Season::One);
        assert_eq!("Season 2".parse::<Season>().unwrap(), Season::Two);
        assert_eq!("s2".parse::<Season>().unwrap(), Season::Two);
        assert!("3".parse::<Season>().is_err());
    }

    #[test]
    fn test_saves_dir_layout() {
        if let Some(dir) = Season::Two.default_saves_dir() {
            assert!(dir.ends_with("Telltale Games/S2"));
        }
    }
}
