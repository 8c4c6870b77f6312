//! Main entry point for hucsnap

#![deny(warnings, missing_docs, trivial_casts, unused_qualifications)]
#![forbid(unsafe_code)]

use i18n_embed::DesktopLanguageRequester;

/// Boot hucsnap
fn main() {
    hucsnap::application::boot(DesktopLanguageRequester::requested_languages());
}
