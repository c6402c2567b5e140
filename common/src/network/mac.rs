//! OUI vendor resolution.
//!
//! The `mac_oui` database is a few MB, so it is loaded lazily once per
//! process and shared behind a `OnceLock`.

use std::sync::OnceLock;

use mac_oui::Oui;
use pnet::datalink::MacAddr;
use tracing::warn;

static OUI_DB: OnceLock<Option<Oui>> = OnceLock::new();

fn oui_db() -> Option<&'static Oui> {
    OUI_DB
        .get_or_init(|| match Oui::default() {
            Ok(db) => Some(db),
            Err(e) => {
                warn!("OUI database unavailable, vendors will be Unknown: {e}");
                None
            }
        })
        .as_ref()
}

/// Maps a MAC address to a vendor name. The lookup is keyed on the OUI
/// prefix; unlisted prefixes resolve to `None`.
pub trait VendorRepository: Send + Sync {
    fn vendor_for(&self, mac: MacAddr) -> Option<String>;
}

/// Production lookup over the bundled IEEE OUI registry.
pub struct MacOuiRepo;

impl VendorRepository for MacOuiRepo {
    fn vendor_for(&self, mac: MacAddr) -> Option<String> {
        let db = oui_db()?;
        match db.lookup_by_mac(&mac.to_string()) {
            Ok(Some(entry)) => Some(entry.company_name.clone()),
            _ => None,
        }
    }
}
