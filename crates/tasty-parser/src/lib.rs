//! Parser for the tasty style value language.
//!
//! Style values are short strings mixing CSS with a few extensions:
//!
//! - Custom units that expand to theme variables: `2x` -> `calc(2 * var(--gap))`
//! - Theme colors: `#purple.50` -> `rgba(var(--purple-color-rgb), 0.5)`
//! - Custom property references: `@gap` -> `var(--gap)`
//! - Implicit `calc()`: `100% - 2x` -> `calc(100% - (2 * var(--gap)))`
//! - Mods: bare keywords such as `top` or `center`, collected separately
//!
//! # Example
//!
//! ```rust
//! use tasty_parser::{ParseMode, StyleParser};
//!
//! let parser = StyleParser::new();
//! let parsed = parser.parse_style("1bw solid #border top", ParseMode::Default);
//!
//! assert_eq!(parsed.values, vec!["var(--border-width)", "solid"]);
//! assert_eq!(parsed.mods, vec!["top"]);
//! assert_eq!(parsed.color, "var(--border-color)");
//!
//! let color = parser.parse_color("#purple.50", false);
//! assert_eq!(color.color.as_deref(), Some("rgba(var(--purple-color-rgb), 0.5)"));
//! ```
//!
//! # Parse modes
//!
//! | Mode | Effect |
//! |------|--------|
//! | `Default` | resolve colors, implicit calc |
//! | `RemInsertion` | bare top-level numbers gain `rem` |
//! | `NoAutoCalc` | no implicit calc for groups and operators |
//! | `IgnoreColor` | keep `#name` tokens raw |

mod cache;
mod color;
mod error;
mod lexer;
mod parser;
mod units;

pub use cache::{CacheStats, EvictionPolicy, StyleCache};
pub use color::{resolve_hash_color, rgb_channels, ParsedColor};
pub use error::{ParseError, Result};
pub use parser::{ParseMode, ParsedStyle, StyleParser, DEFAULT_TOKEN_CACHE_SIZE};
pub use units::{UnitExpansion, UnitFn, UnitRegistry};
