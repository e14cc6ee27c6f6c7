use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Structured investment criteria, stated by a participant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuyBox {
    #[serde(default)]
    pub min_price: Option<f64>,
    #[serde(default)]
    pub max_price: Option<f64>,
    /// Target asset classes, e.g. "Multifamily", "SFH"
    #[serde(default)]
    pub assets: Vec<String>,
    /// Target markets/locations, e.g. "Texas", "Atlanta"
    #[serde(default)]
    pub markets: Vec<String>,
    /// Strategies, e.g. "Buy & Hold", "Fix & Flip"
    #[serde(default)]
    pub strategy: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl BuyBox {
    /// Whether this buy box carries concrete data. An existing buy box is
    /// only overwritten by a more concrete incoming one.
    pub fn is_concrete(&self) -> bool {
        self.min_price.is_some() || self.max_price.is_some() || !self.assets.is_empty()
    }
}

/// A social media profile link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    /// Platform name, e.g. "Twitter", "LinkedIn", "Blinq"
    pub platform: String,
    pub url: String,
}

/// A partial, mergeable description of one person extracted from one chunk.
/// Fragments for the same name from different chunks are merged: set-valued
/// fields union, scalar text fields keep the first non-empty value seen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileFragment {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// Explicit roles, e.g. "Investor", "Wholesaler"
    #[serde(default)]
    pub role_tags: BTreeSet<String>,
    /// Communities they belong to, e.g. "Subto", "Gator"
    #[serde(default)]
    pub communities: BTreeSet<String>,
    /// Asset classes they deal with
    #[serde(default)]
    pub asset_classes: BTreeSet<String>,
    /// Investment criteria if stated
    #[serde(default)]
    pub buy_box: Option<BuyBox>,
    /// Current specific focus/project
    #[serde(default)]
    pub hot_plate: Option<String>,
    /// Skills or services they offer
    #[serde(default)]
    pub i_can_help_with: Option<String>,
    /// What they are looking for help with
    #[serde(default)]
    pub help_me_with: Option<String>,
    /// General statement or bio
    #[serde(default)]
    pub message_to_world: Option<String>,
    /// Social media links, unique per platform
    #[serde(default)]
    pub socials: Vec<SocialLink>,
}

impl ProfileFragment {
    /// Whether the fragment carries substantive content. Used by the
    /// finalizer to decide if a name earns a contact entry on profile
    /// evidence alone.
    pub fn has_substance(&self) -> bool {
        !self.communities.is_empty() || self.buy_box.is_some() || !self.role_tags.is_empty()
    }

    /// Merge another fragment for the same name into this one.
    ///
    /// Set-valued fields union (commutative). Scalar text fields keep the
    /// first non-empty value seen. The buy box is overwritten only when the
    /// incoming fragment carries more concrete data than the existing one.
    pub fn merge_from(&mut self, other: ProfileFragment) {
        self.role_tags.extend(other.role_tags);
        self.communities.extend(other.communities);
        self.asset_classes.extend(other.asset_classes);

        merge_scalar(&mut self.email, other.email);
        merge_scalar(&mut self.phone, other.phone);
        merge_scalar(&mut self.hot_plate, other.hot_plate);
        merge_scalar(&mut self.i_can_help_with, other.i_can_help_with);
        merge_scalar(&mut self.help_me_with, other.help_me_with);
        merge_scalar(&mut self.message_to_world, other.message_to_world);

        if let Some(incoming) = other.buy_box {
            match &self.buy_box {
                None => self.buy_box = Some(incoming),
                Some(_) if incoming.is_concrete() => self.buy_box = Some(incoming),
                Some(_) => {}
            }
        }

        for link in other.socials {
            let exists = self
                .socials
                .iter()
                .any(|s| s.platform.eq_ignore_ascii_case(&link.platform));
            if !exists {
                self.socials.push(link);
            }
        }
    }
}

/// First-writer-wins for scalar text fields; empty strings count as absent.
fn merge_scalar(existing: &mut Option<String>, incoming: Option<String>) {
    let is_empty = existing.as_deref().is_none_or(|s| s.trim().is_empty());
    if is_empty {
        if let Some(value) = incoming {
            if !value.trim().is_empty() {
                *existing = Some(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(name: &str) -> ProfileFragment {
        ProfileFragment {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_set_fields_merge_commutatively() {
        let mut a = fragment("Carly");
        a.communities.insert("Subto".to_string());
        a.role_tags.insert("Investor".to_string());

        let mut b = fragment("Carly");
        b.communities.insert("Gator".to_string());
        b.role_tags.insert("Lender".to_string());

        let mut ab = a.clone();
        ab.merge_from(b.clone());
        let mut ba = b;
        ba.merge_from(a);

        assert_eq!(ab.communities, ba.communities);
        assert_eq!(ab.role_tags, ba.role_tags);
    }

    #[test]
    fn test_scalar_fields_first_writer_wins() {
        let mut a = fragment("Carly");
        a.hot_plate = Some("Closing a duplex".to_string());

        let mut b = fragment("Carly");
        b.hot_plate = Some("Something else".to_string());
        b.message_to_world = Some("Happy to connect".to_string());

        a.merge_from(b);
        assert_eq!(a.hot_plate.as_deref(), Some("Closing a duplex"));
        assert_eq!(a.message_to_world.as_deref(), Some("Happy to connect"));
    }

    #[test]
    fn test_buy_box_overwritten_only_when_more_concrete() {
        let mut a = fragment("Carly");
        a.buy_box = Some(BuyBox {
            description: Some("buying in the southeast".to_string()),
            ..Default::default()
        });

        // Vague incoming box does not displace the existing one
        let mut vague = fragment("Carly");
        vague.buy_box = Some(BuyBox {
            description: Some("looking for deals".to_string()),
            ..Default::default()
        });
        a.merge_from(vague);
        assert_eq!(
            a.buy_box.as_ref().unwrap().description.as_deref(),
            Some("buying in the southeast")
        );

        // Concrete incoming box does
        let mut concrete = fragment("Carly");
        concrete.buy_box = Some(BuyBox {
            max_price: Some(500_000.0),
            min_price: Some(100_000.0),
            assets: vec!["SFH".to_string()],
            ..Default::default()
        });
        a.merge_from(concrete);
        assert_eq!(a.buy_box.as_ref().unwrap().max_price, Some(500_000.0));
    }

    #[test]
    fn test_socials_unique_per_platform() {
        let mut a = fragment("Carly");
        a.socials.push(SocialLink {
            platform: "Blinq".to_string(),
            url: "https://blinq.me/carly".to_string(),
        });

        let mut b = fragment("Carly");
        b.socials.push(SocialLink {
            platform: "blinq".to_string(),
            url: "https://blinq.me/carly2".to_string(),
        });
        b.socials.push(SocialLink {
            platform: "LinkedIn".to_string(),
            url: "https://linkedin.com/in/carly".to_string(),
        });

        a.merge_from(b);
        assert_eq!(a.socials.len(), 2);
        assert_eq!(a.socials[0].url, "https://blinq.me/carly");
    }

    #[test]
    fn test_empty_scalar_treated_as_absent() {
        let mut a = fragment("Carly");
        a.help_me_with = Some("  ".to_string());

        let mut b = fragment("Carly");
        b.help_me_with = Some("dispo partners".to_string());

        a.merge_from(b);
        assert_eq!(a.help_me_with.as_deref(), Some("dispo partners"));
    }
}
