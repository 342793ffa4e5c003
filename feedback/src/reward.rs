// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// The kinds of feedback a user gives on a generated image.
#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    #[display(fmt = "like")]
    Like,
    #[display(fmt = "save")]
    Save,
    #[display(fmt = "share")]
    Share,
    #[display(fmt = "dislike")]
    Dislike,
    /// The image doesn't fit the collection at all.
    #[display(fmt = "outlier")]
    Outlier,
    /// The user asked for the image to be generated again.
    #[display(fmt = "regenerate")]
    Regenerate,
}

/// The scalar reward per kind of feedback.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct RewardTable {
    pub like: f32,
    pub save: f32,
    pub share: f32,
    pub dislike: f32,
    pub outlier: f32,
    pub regenerate: f32,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            like: 1.0,
            save: 1.2,
            share: 1.5,
            dislike: -0.8,
            outlier: -1.0,
            regenerate: -0.5,
        }
    }
}

impl RewardTable {
    pub fn reward(&self, kind: FeedbackKind) -> f32 {
        match kind {
            FeedbackKind::Like => self.like,
            FeedbackKind::Save => self.save,
            FeedbackKind::Share => self.share,
            FeedbackKind::Dislike => self.dislike,
            FeedbackKind::Outlier => self.outlier,
            FeedbackKind::Regenerate => self.regenerate,
        }
    }

    pub(crate) fn is_finite(&self) -> bool {
        [
            self.like,
            self.save,
            self.share,
            self.dislike,
            self.outlier,
            self.regenerate,
        ]
        .iter()
        .all(|reward| reward.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rewards_have_sign_of_kind() {
        let table = RewardTable::default();
        for kind in [FeedbackKind::Like, FeedbackKind::Save, FeedbackKind::Share] {
            assert!(table.reward(kind) > 0., "{kind}");
        }
        for kind in [
            FeedbackKind::Dislike,
            FeedbackKind::Outlier,
            FeedbackKind::Regenerate,
        ] {
            assert!(table.reward(kind) < 0., "{kind}");
        }
    }

    #[test]
    fn test_deserialize_kind() {
        let kind = serde_json::from_str::<FeedbackKind>(r#""outlier""#).unwrap();
        assert_eq!(kind, FeedbackKind::Outlier);
        assert!(serde_json::from_str::<FeedbackKind>(r#""love""#).is_err());
    }

    #[test]
    fn test_partial_table() {
        let table = serde_json::from_str::<RewardTable>(r#"{"like": 0.5}"#).unwrap();
        assert_eq!(table.reward(FeedbackKind::Like), 0.5);
        assert_eq!(table.reward(FeedbackKind::Share), 1.5);
    }
}
