use base64::{Engine as _, engine::general_purpose::STANDARD};
use md5::{Digest, Md5};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Base64-encoded MD5 of `data`, the form S3 expects in `Content-MD5`.
pub fn calculate_md5_base64(data: &[u8]) -> String {
    let mut hasher = Md5::new();
    hasher.update(data);
    STANDARD.encode(hasher.finalize())
}

pub async fn calculate_md5_base64_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
) -> std::io::Result<String> {
    let mut hasher = Md5::new();
    let mut buffer = [0u8; 8192];
    loop {
        let n = reader.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(STANDARD.encode(hasher.finalize()))
}
