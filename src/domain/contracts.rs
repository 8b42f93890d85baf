//! Allow-list verification of token contract addresses

/// Known official deployments: (token, network, address)
const OFFICIAL_TOKENS: &[(&str, &str, &str)] = &[
    ("PEPE", "ethereum", "0x6982508145454ce325ddbe47a25d4ec3d2311933"),
    ("PEPE", "bsc", "0xb46584e0efde3092e04010a13f2eae62adb3b9f0"),
    ("PEPE", "arbitrum", "0x25d887ce7a35172c62febfd67a1856f20faebb00"),
];

/// Outcome of checking a user-supplied contract address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractVerdict {
    /// Matches a known official deployment
    Official,
    /// Well-formed but not on the allow-list for that network
    Unverified,
    /// Not a 0x-prefixed 40-hex-digit address
    BadFormat,
}

impl ContractVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContractVerdict::Official => "official contract",
            ContractVerdict::Unverified => "possible fake or unconfirmed network",
            ContractVerdict::BadFormat => "invalid address format",
        }
    }
}

/// Compare an address against the allow-list for one network.
/// Comparison is case-insensitive; checksummed input is fine.
pub fn verify(network: &str, address: &str) -> ContractVerdict {
    let address = address.trim().to_lowercase();
    if !address.starts_with("0x")
        || address.len() != 42
        || !address[2..].chars().all(|c| c.is_ascii_hexdigit())
    {
        return ContractVerdict::BadFormat;
    }

    let official = OFFICIAL_TOKENS
        .iter()
        .any(|(_, net, addr)| *net == network && *addr == address);

    if official {
        ContractVerdict::Official
    } else {
        ContractVerdict::Unverified
    }
}
