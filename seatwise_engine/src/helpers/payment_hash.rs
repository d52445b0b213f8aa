use hmac::{digest::InvalidLength, Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// The card details that are hashed before they are handed to the payment gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardHashRequest {
    pub booking_id: i64,
    pub card_id: String,
    pub card_name: String,
    pub cvc: String,
}

impl CardHashRequest {
    /// The canonical string that is signed: `bookingId&cardId&cardName&cvc`.
    pub fn canonical_string(&self) -> String {
        format!("{}&{}&{}&{}", self.booking_id, self.card_id, self.card_name, self.cvc)
    }
}

/// Hex-encoded HMAC-SHA256 of `data` under `key`.
pub fn calculate_hmac(key: &str, data: &[u8]) -> Result<String, InvalidLength> {
    let mut mac = HmacSha256::new_from_slice(key.as_bytes())?;
    mac.update(data);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

pub fn card_hash(key: &str, request: &CardHashRequest) -> Result<String, InvalidLength> {
    calculate_hmac(key, request.canonical_string().as_bytes())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rfc4231_test_case_2() {
        let mac = calculate_hmac("Jefe", b"what do ya want for nothing?").unwrap();
        assert_eq!(mac, "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843");
    }

    #[test]
    fn card_hash_signs_the_canonical_string() {
        let req = CardHashRequest {
            booking_id: 17,
            card_id: "4111111111111111".into(),
            card_name: "NGUYEN VAN A".into(),
            cvc: "123".into(),
        };
        assert_eq!(req.canonical_string(), "17&4111111111111111&NGUYEN VAN A&123");
        let hash = card_hash("secret", &req).unwrap();
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, calculate_hmac("secret", b"17&4111111111111111&NGUYEN VAN A&123").unwrap());
        assert_ne!(hash, card_hash("other-secret", &req).unwrap());
    }
}
