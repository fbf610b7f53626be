//! NFTs owned by an account.

use serde::Serialize;
use serde_json::{Map, Value};

use super::contract_package::ContractTypeId;
use super::explorer;
use super::keys::strip_prefix;
use super::network::CasperNetwork;

/// Media type reported for content the wallet cannot preview.
pub const UNKNOWN_MEDIA_TYPE: &str = "unknown";

/// Metadata keys that may carry the token's display name.
const NAME_KEYS: [&str; 2] = ["name", "title"];

/// Metadata keys that may carry the token's image, most specific first.
const IMAGE_KEYS: [&str; 6] = ["image", "image_url", "imageUrl", "asset", "pictureURL", "ipfs_url"];

/// One key/value pair of token metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NftMetadataEntry {
    pub key: String,
    pub value: String,
}

/// A token held by the account, with its metadata flattened for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    pub id: String,
    pub token_id: String,
    pub contract_package_hash: String,
    pub collection_name: String,
    pub contract_type: Option<ContractTypeId>,
    pub owner_public_key: Option<String>,
    pub owner_account_hash: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub metadata: Vec<NftMetadataEntry>,
    pub is_burned: bool,
    pub timestamp: String,
    pub explorer_link: Option<String>,
}

impl Nft {
    /// Create from one `nft-tokens` entry.
    ///
    /// Metadata is the on-chain list, then any off-chain and on-chain object
    /// fields under keys not seen yet.
    #[must_use]
    pub fn from_json(network: CasperNetwork, json: &Value) -> Self {
        let package = &json["contract_package"];
        let contract_package_hash = strip_prefix(json["contract_package_hash"].as_str().unwrap_or(""));
        let token_id = text(&json["token_id"]).unwrap_or_default();
        let metadata = collect_metadata(json);

        Self {
            id: text(&json["tracking_id"]).unwrap_or_else(|| format!("{contract_package_hash}-{token_id}")),
            explorer_link: explorer::nft_token_url(network.chain_name(), &contract_package_hash, &token_id),
            collection_name: package["name"].as_str().unwrap_or("").to_string(),
            contract_type: package["latest_version_contract_type_id"]
                .as_u64()
                .or_else(|| package["contract_type_id"].as_u64())
                .and_then(ContractTypeId::from_id),
            owner_public_key: json["owner_public_key"].as_str().map(String::from),
            owner_account_hash: strip_prefix(
                json["owner_account_hash"]
                    .as_str()
                    .or_else(|| json["owner_hash"].as_str())
                    .unwrap_or(""),
            ),
            name: lookup(&metadata, &NAME_KEYS),
            description: lookup(&metadata, &["description"]),
            image_url: lookup(&metadata, &IMAGE_KEYS),
            is_burned: json["is_burned"].as_bool().unwrap_or(false),
            timestamp: json["timestamp"].as_str().unwrap_or("").to_string(),
            contract_package_hash,
            token_id,
            metadata,
        }
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn collect_metadata(json: &Value) -> Vec<NftMetadataEntry> {
    let mut entries: Vec<NftMetadataEntry> = json["metadata"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|entry| {
            Some(NftMetadataEntry {
                key: entry["key"].as_str()?.to_string(),
                value: text(&entry["value"])?,
            })
        })
        .collect();

    let objects = [&json["offchain_metadata"], &json["onchain_metadata"]];
    for object in objects.into_iter().filter_map(Value::as_object) {
        append_new(&mut entries, object);
    }
    entries
}

fn append_new(entries: &mut Vec<NftMetadataEntry>, object: &Map<String, Value>) {
    for (key, value) in object {
        if entries.iter().any(|entry| entry.key == *key) {
            continue;
        }
        if let Some(value) = text(value) {
            entries.push(NftMetadataEntry {
                key: key.clone(),
                value,
            });
        }
    }
}

fn lookup(entries: &[NftMetadataEntry], keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        entries
            .iter()
            .find(|entry| entry.key == *key && !entry.value.is_empty())
            .map(|entry| entry.value.clone())
    })
}

/// Previewable media type from a `Content-Type` header: image, video and
/// audio types pass through, anything else is [`UNKNOWN_MEDIA_TYPE`].
#[must_use]
pub fn media_type(content_type: Option<&str>) -> String {
    match content_type.map(str::trim) {
        Some(ty) if ["image", "video", "audio"].iter().any(|kind| ty.starts_with(kind)) => ty.to_string(),
        _ => UNKNOWN_MEDIA_TYPE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case::image(Some("image/png"), "image/png")]
    #[case::video(Some("video/mp4"), "video/mp4")]
    #[case::json(Some("application/json"), "unknown")]
    #[case::missing(None, "unknown")]
    fn test_media_type(#[case] content_type: Option<&str>, #[case] expected: &str) {
        assert_eq!(media_type(content_type), expected);
    }

    #[test]
    fn test_list_metadata_wins_over_objects() {
        let json = json!({
            "metadata": [{"key": "name", "value": "On chain"}],
            "offchain_metadata": {"name": "Off chain", "image": "ipfs://img"},
            "onchain_metadata": {"rarity": 3}
        });
        let metadata = collect_metadata(&json);
        assert_eq!(lookup(&metadata, &NAME_KEYS).as_deref(), Some("On chain"));
        assert_eq!(lookup(&metadata, &IMAGE_KEYS).as_deref(), Some("ipfs://img"));
        assert_eq!(lookup(&metadata, &["rarity"]).as_deref(), Some("3"));
    }
}
