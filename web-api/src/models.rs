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

use std::str::FromStr;

use derive_more::{AsRef, Display, Into};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::common::{InvalidCategory, InvalidUserId};

macro_rules! id_wrapper {
    ($(#[$attribute:meta])* $name:ident, $validate:expr, $error:ident) => {
        $(#[$attribute])*
        #[derive(
            AsRef,
            Into,
            Clone,
            Debug,
            Display,
            PartialEq,
            Eq,
            Hash,
            Serialize,
            Deserialize,
        )]
        #[as_ref(forward)]
        #[serde(try_from = "String", into = "String")]
        pub(crate) struct $name(String);

        impl $name {
            pub(crate) fn new(id: impl Into<String> + AsRef<str>) -> Result<Self, $error> {
                if ($validate)(id.as_ref()) {
                    Ok(Self(id.into()))
                } else {
                    Err($error { id: id.into() })
                }
            }

            pub(crate) fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $error;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = $error;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl FromStr for $name {
            type Err = $error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

fn is_valid_id(id: &str) -> bool {
    static RE: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-:@.]+$").ok());
    RE.as_ref().map_or(false, |re| re.is_match(id))
}

id_wrapper!(
    /// A unique identifier of a user.
    UserId,
    is_valid_id,
    InvalidUserId
);

id_wrapper!(
    /// The name of an attribute family or prompt token category.
    Category,
    is_valid_id,
    InvalidCategory
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id() {
        assert!(UserId::new("designer-42@studio.io").is_ok());
        assert!(UserId::new("").is_err());
        assert!(UserId::new("no spaces").is_err());
        assert!(UserId::new("a/b").is_err());
    }

    #[test]
    fn test_deserialize_validates() {
        let category = serde_json::from_str::<Category>(r#""garmentType""#).unwrap();
        assert_eq!(category.as_str(), "garmentType");
        assert!(serde_json::from_str::<Category>(r#""garment type""#).is_err());
    }
}
