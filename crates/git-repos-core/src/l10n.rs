//! Localization support using Project Fluent.
//!
//! This module provides internationalization (i18n) capabilities using the
//! Fluent localization system. Translations ship embedded in the binary and
//! can be overridden by `.ftl` files on disk.
//!
//! # Supported Locales
//!
//! - English (en) - Default fallback
//! - German (de)
//! - Portuguese (pt)
//!
//! # Example
//!
//! ```
//! use git_repos_core::l10n::Localizer;
//!
//! let localizer = Localizer::new("en").unwrap();
//! let message = localizer.get("scan-complete", Some(&[("count", "42")]));
//! assert_eq!(message, "Found 42 repositories.");
//! ```

use crate::error::{Error, Result};
use fluent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// The default locale used when no locale is specified or loading fails.
pub const DEFAULT_LOCALE: &str = "en";

/// Locales with embedded translations.
pub const SUPPORTED_LOCALES: &[&str] = &["en", "de", "pt"];

/// Manages localization resources and message formatting.
pub struct Localizer {
    bundle: FluentBundle<FluentResource>,
    locale: LanguageIdentifier,
}

impl Localizer {
    /// Creates a new Localizer for the specified locale.
    ///
    /// Only the language part of the identifier is used to pick translations,
    /// so `pt-BR` loads the Portuguese resources. Unsupported languages fall
    /// back to English.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The locale identifier is invalid
    /// - A translation file on disk has invalid FTL syntax
    ///
    /// # Example
    ///
    /// ```
    /// use git_repos_core::l10n::Localizer;
    ///
    /// let localizer = Localizer::new("de").unwrap();
    /// assert_eq!(localizer.locale(), "de");
    /// ```
    pub fn new(locale_str: &str) -> Result<Self> {
        let requested: LanguageIdentifier = locale_str
            .parse()
            .map_err(|_| Error::l10n(format!("Invalid locale: {}", locale_str)))?;

        let language = requested.language.as_str().to_string();
        let (bundle, locale) = match Self::load_locale(&language) {
            Ok(loaded) => loaded,
            Err(e) if language != DEFAULT_LOCALE => {
                debug!(locale = %locale_str, error = %e, "falling back to default locale");
                Self::load_locale(DEFAULT_LOCALE)?
            }
            Err(e) => return Err(e),
        };

        Ok(Self { bundle, locale })
    }

    /// Creates a Localizer using the system's default locale.
    ///
    /// # Example
    ///
    /// ```
    /// use git_repos_core::l10n::Localizer;
    ///
    /// let localizer = Localizer::from_system().unwrap();
    /// ```
    pub fn from_system() -> Result<Self> {
        Self::new(&detect_system_locale())
    }

    /// Loads translation resources for a language code.
    ///
    /// Searches for the locale file in these locations (in order):
    /// 1. `./locales/{locale}/main.ftl` (current directory)
    /// 2. `./crates/git-repos-core/locales/{locale}/main.ftl` (workspace structure)
    /// 3. Embedded resources
    fn load_locale(
        locale_code: &str,
    ) -> Result<(FluentBundle<FluentResource>, LanguageIdentifier)> {
        let locale: LanguageIdentifier = locale_code
            .parse()
            .map_err(|_| Error::l10n(format!("Invalid locale: {}", locale_code)))?;

        let possible_paths = [
            PathBuf::from(format!("locales/{}/main.ftl", locale_code)),
            PathBuf::from(format!(
                "crates/git-repos-core/locales/{}/main.ftl",
                locale_code
            )),
        ];

        let ftl_content = possible_paths
            .iter()
            .find_map(|path| fs::read_to_string(path).ok())
            .or_else(|| get_embedded_locale(locale_code).map(str::to_string))
            .ok_or_else(|| {
                Error::l10n(format!("Could not find locale file for '{}'", locale_code))
            })?;

        let resource = FluentResource::try_new(ftl_content)
            .map_err(|(_, errors)| Error::l10n(format!("Failed to parse FTL: {:?}", errors)))?;

        let mut bundle = FluentBundle::new(vec![locale.clone()]);
        // Output goes to a terminal, not a bidi-aware renderer
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|e| Error::l10n(format!("Failed to add resource: {:?}", e)))?;

        Ok((bundle, locale))
    }

    /// Retrieves a translated message by its identifier.
    ///
    /// Argument values that look like integers are passed to Fluent as
    /// numbers so plural selectors work.
    ///
    /// Returns `[msg_id]` if the message doesn't exist.
    ///
    /// # Example
    ///
    /// ```
    /// # use git_repos_core::l10n::Localizer;
    /// # let localizer = Localizer::new("en").unwrap();
    /// let msg = localizer.get("header-name", None);
    /// assert_eq!(msg, "Name");
    ///
    /// let msg = localizer.get("scan-complete", Some(&[("count", "1")]));
    /// assert_eq!(msg, "Found 1 repository.");
    /// ```
    pub fn get(&self, msg_id: &str, args: Option<&[(&str, &str)]>) -> String {
        let Some(pattern) = self
            .bundle
            .get_message(msg_id)
            .and_then(|message| message.value())
        else {
            return format!("[{}]", msg_id);
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (key, value) in args {
                let value = match value.parse::<i64>() {
                    Ok(number) => FluentValue::from(number),
                    Err(_) => FluentValue::from(value.to_string()),
                };
                fluent_args.set(key.to_string(), value);
            }
            fluent_args
        });

        let mut errors = vec![];
        let formatted = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors);

        if !errors.is_empty() {
            warn!(msg_id, ?errors, "Fluent formatting errors");
        }

        formatted.into_owned()
    }

    /// Gets the current locale identifier.
    pub fn locale(&self) -> String {
        self.locale.to_string()
    }
}

/// Detects the system locale from environment variables.
///
/// Checks `LC_ALL`, `LC_MESSAGES` and `LANG` in that order and returns the
/// language code, or `"en"` as fallback.
///
/// With `LANG=pt_BR.UTF-8`, this function returns `"pt"`.
pub fn detect_system_locale() -> String {
    ["LC_ALL", "LC_MESSAGES", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| language_code(&value))
        .unwrap_or_else(|| DEFAULT_LOCALE.to_string())
}

/// Extracts the language from a POSIX locale string like `de_DE.UTF-8`.
fn language_code(posix_locale: &str) -> Option<String> {
    let language = posix_locale
        .split(['_', '.', '@', '-'])
        .next()?
        .to_lowercase();

    match language.as_str() {
        "" | "c" | "posix" => None,
        _ => Some(language),
    }
}

/// Returns the translations compiled into the crate.
fn get_embedded_locale(locale_code: &str) -> Option<&'static str> {
    match locale_code {
        "en" => Some(include_str!("../locales/en/main.ftl")),
        "de" => Some(include_str!("../locales/de/main.ftl")),
        "pt" => Some(include_str!("../locales/pt/main.ftl")),
        _ => None,
    }
}
