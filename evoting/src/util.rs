use ed25519_dalek::Keypair;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;

pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let mut csprng = rand::rngs::OsRng;
    let Keypair { public, secret } = Keypair::generate(&mut csprng);
    (secret, public)
}

/// Decode standard base64, restoring any padding the client dropped.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let data = data.trim();
    match data.len() % 4 {
        0 => base64::decode(data),
        rem => {
            let mut padded = String::with_capacity(data.len() + 4 - rem);
            padded.push_str(data);
            for _ in rem..4 {
                padded.push('=');
            }
            base64::decode(&padded)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_base64_restores_padding() {
        let encoded = base64::encode(b"ab");
        assert_eq!(encoded, "YWI=");
        assert_eq!(decode_base64("YWI=").unwrap(), b"ab");
        assert_eq!(decode_base64("YWI").unwrap(), b"ab");
        assert_eq!(decode_base64(" YWI= ").unwrap(), b"ab");
    }

    #[test]
    fn decode_base64_rejects_garbage() {
        assert!(decode_base64("not base64!").is_err());
    }
}
