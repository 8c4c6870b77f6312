use std::sync::LazyLock;

use i18n_embed::{
    fluent::{FluentLanguageLoader, fluent_language_loader},
    unic_langid::LanguageIdentifier,
};
use rust_embed::RustEmbed;

#[derive(RustEmbed)]
#[folder = "i18n"]
struct Localizations;

pub(crate) static LANGUAGE_LOADER: LazyLock<FluentLanguageLoader> =
    LazyLock::new(|| fluent_language_loader!());

/// Selects the most suitable available language in order of preference by
/// `requested_languages`, and loads it using the `hucsnap` [`static@LANGUAGE_LOADER`]
/// from the languages available in `hucsnap/i18n/`.
///
/// Returns the available languages that were negotiated as being the most suitable to be
/// selected, and were loaded by [`i18n_embed::select`].
pub(crate) fn load_languages(
    requested_languages: &[LanguageIdentifier],
) -> Vec<LanguageIdentifier> {
    // The fallback language is embedded, so selection can only fail if the binary was
    // built without it.
    let supported_languages =
        i18n_embed::select(&*LANGUAGE_LOADER, &Localizations, requested_languages)
            .unwrap_or_default();
    // Unicode Directionality Isolation Marks render as garbage in most terminals.
    LANGUAGE_LOADER.set_use_isolating(false);
    supported_languages
}
