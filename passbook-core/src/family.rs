//! Bank layout families and the extraction mode requested by the caller.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One issuing bank's statement layout convention
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankFamily {
    Axis,
    YesBank,
    Kotak,
    Jk,
    Hdfc,
    Standard,
}

impl BankFamily {
    pub const ALL: [BankFamily; 6] = [
        BankFamily::Axis,
        BankFamily::YesBank,
        BankFamily::Kotak,
        BankFamily::Jk,
        BankFamily::Hdfc,
        BankFamily::Standard,
    ];

    /// Fixed tag stamped on every transaction produced for this family
    pub fn tag(&self) -> &'static str {
        match self {
            BankFamily::Axis => "AXIS",
            BankFamily::YesBank => "YESBANK",
            BankFamily::Kotak => "KOTAK",
            BankFamily::Jk => "J&K",
            BankFamily::Hdfc => "HDFC",
            BankFamily::Standard => "Standard/SBI",
        }
    }

    /// Name accepted on the command line
    pub fn name(&self) -> &'static str {
        match self {
            BankFamily::Axis => "axis",
            BankFamily::YesBank => "yesbank",
            BankFamily::Kotak => "kotak",
            BankFamily::Jk => "jk",
            BankFamily::Hdfc => "hdfc",
            BankFamily::Standard => "standard",
        }
    }
}

impl fmt::Display for BankFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bank family: {0} (expected auto, {names})", names = family_names())]
pub struct UnknownFamily(pub String);

fn family_names() -> String {
    BankFamily::ALL
        .iter()
        .map(|f| f.name())
        .collect::<Vec<_>>()
        .join(", ")
}

impl FromStr for BankFamily {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match lower.as_str() {
            "j&k" => return Ok(BankFamily::Jk),
            "sbi" => return Ok(BankFamily::Standard),
            _ => {}
        }
        BankFamily::ALL
            .into_iter()
            .find(|f| f.name() == lower)
            .ok_or_else(|| UnknownFamily(s.to_string()))
    }
}

/// Either detect the family from the document or force one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Auto,
    Family(BankFamily),
}

impl FromStr for Mode {
    type Err = UnknownFamily;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(Mode::Auto);
        }
        s.parse().map(Mode::Family)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => f.write_str("auto"),
            Mode::Family(family) => family.fmt(f),
        }
    }
}
