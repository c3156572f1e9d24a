//! Fundraiser badge tiers.
//!
//! A contributor's badge is picked by ordered range lookup over their cumulative
//! contribution. Amounts that fall in no range (anything below the first tier's
//! minimum, or a fractional amount between two integer bounds) fall back to the
//! lowest tier.

use serde::{Deserialize, Serialize};

use crate::types::Contribution;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeTier {
    PupSupporter,
    PackLeader,
    AlphaBork,
    BorkOg,
    MegaBork,
    BorkchainTeam,
}

#[derive(Debug, Serialize)]
pub struct BadgeInfo {
    pub id: BadgeTier,
    pub name: &'static str,
    pub min_amount: u64,
    /// `None` means unbounded.
    pub max_amount: Option<u64>,
    pub benefits: &'static [&'static str],
}

impl BadgeInfo {
    pub fn contains(&self, amount: f64) -> bool {
        amount >= self.min_amount as f64
            && self.max_amount.map_or(true, |max| amount <= max as f64)
    }

    /// Human-readable price range, e.g. `$5 - $19` or `$5000+`.
    pub fn range_label(&self) -> String {
        match self.max_amount {
            Some(max) => format!("${} - ${}", self.min_amount, max),
            None => format!("${}+", self.min_amount),
        }
    }
}

pub static BADGE_TIERS: [BadgeInfo; 6] = [
    BadgeInfo {
        id: BadgeTier::PupSupporter,
        name: "Pup Supporter",
        min_amount: 5,
        max_amount: Some(19),
        benefits: &[
            "Access to BorkChain community channels",
            "Early updates on project development",
            "Pup Supporter badge on profile",
        ],
    },
    BadgeInfo {
        id: BadgeTier::PackLeader,
        name: "Pack Leader",
        min_amount: 20,
        max_amount: Some(99),
        benefits: &[
            "All Pup Supporter benefits",
            "Exclusive Pack Leader community access",
            "Priority access to future airdrops",
            "Participation in community polls",
        ],
    },
    BadgeInfo {
        id: BadgeTier::AlphaBork,
        name: "Alpha Bork",
        min_amount: 100,
        max_amount: Some(499),
        benefits: &[
            "All Pack Leader benefits",
            "Enhanced airdrop allocation",
            "Exclusive BorkChain Alpha events",
            "Early access to new features",
        ],
    },
    BadgeInfo {
        id: BadgeTier::BorkOg,
        name: "Bork OG",
        min_amount: 500,
        max_amount: Some(999),
        benefits: &[
            "All Alpha Bork benefits",
            "Special OG community recognition",
            "Guaranteed token allocation in future events",
            "Monthly AMAs with BorkChain team",
            "Priority technical support",
        ],
    },
    BadgeInfo {
        id: BadgeTier::MegaBork,
        name: "Mega Bork",
        min_amount: 1000,
        max_amount: Some(4999),
        benefits: &[
            "All Bork OG benefits",
            "VIP access to all BorkChain events",
            "Monthly strategy sessions with team",
            "Custom profile features",
            "Priority feature requests",
        ],
    },
    BadgeInfo {
        id: BadgeTier::BorkchainTeam,
        name: "BorkChain Team",
        min_amount: 5000,
        max_amount: None,
        benefits: &[
            "All Mega Bork benefits",
            "Direct access to BorkChain founders",
            "Recognized partner on BorkChain website",
            "Special mentions in project announcements",
            "Early access to all product updates",
            "Exclusive strategic partnership opportunities",
        ],
    },
];

/// Classify a cumulative contribution amount.
///
/// Returns the first tier whose range contains `amount`, or the lowest tier
/// when nothing matches (including zero, negative and NaN amounts).
pub fn classify(amount: f64) -> &'static BadgeInfo {
    BADGE_TIERS
        .iter()
        .find(|tier| tier.contains(amount))
        .unwrap_or(&BADGE_TIERS[0])
}

/// Sum the approved contributions and classify the total.
pub fn classify_total<'a, I>(contributions: I) -> (f64, &'static BadgeInfo)
where
    I: IntoIterator<Item = &'a Contribution>,
{
    let total: f64 = contributions
        .into_iter()
        .filter(|c| c.approved)
        .map(|c| c.amount)
        .sum();
    (total, classify(total))
}
