//! NTLMv2 message construction for HTTP `Authorization: NTLM` handshakes.
//!
//! On-premise Dynamics deployments authenticate with integrated Windows
//! authentication. The client sends a NEGOTIATE message, the server answers
//! `401` with a CHALLENGE in `WWW-Authenticate`, and the client replies on the
//! same connection with an AUTHENTICATE message carrying an NTLMv2 response.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use md4::{Digest, Md4};
use md5::Md5;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{Result, ToolError};

type HmacMd5 = Hmac<Md5>;

const SIGNATURE: &[u8; 8] = b"NTLMSSP\0";

const NEGOTIATE_UNICODE: u32 = 0x0000_0001;
const NEGOTIATE_OEM: u32 = 0x0000_0002;
const REQUEST_TARGET: u32 = 0x0000_0004;
const NEGOTIATE_NTLM: u32 = 0x0000_0200;
const NEGOTIATE_ALWAYS_SIGN: u32 = 0x0000_8000;
const NEGOTIATE_EXTENDED_SESSIONSECURITY: u32 = 0x0008_0000;
const NEGOTIATE_TARGET_INFO: u32 = 0x0080_0000;
const NEGOTIATE_128: u32 = 0x2000_0000;
const NEGOTIATE_56: u32 = 0x8000_0000;

const NEGOTIATE_FLAGS: u32 = NEGOTIATE_UNICODE
    | NEGOTIATE_OEM
    | REQUEST_TARGET
    | NEGOTIATE_NTLM
    | NEGOTIATE_ALWAYS_SIGN
    | NEGOTIATE_EXTENDED_SESSIONSECURITY
    | NEGOTIATE_TARGET_INFO
    | NEGOTIATE_128
    | NEGOTIATE_56;

/// AV pair id of the server timestamp in the target info block
const MSV_AV_TIMESTAMP: u16 = 7;
const MSV_AV_EOL: u16 = 0;

/// 100ns intervals between 1601-01-01 and the Unix epoch
const FILETIME_UNIX_OFFSET: u64 = 116_444_736_000_000_000;

/// Account used for the handshake
#[derive(Clone)]
pub struct NtlmCredentials {
    pub domain: String,
    pub username: String,
    pub password: String,
    pub workstation: String,
}

/// Parsed server CHALLENGE message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    pub flags: u32,
    pub server_challenge: [u8; 8],
    pub target_info: Vec<u8>,
}

impl Challenge {
    /// Server timestamp from the target info, if the server sent one
    pub fn timestamp(&self) -> Option<u64> {
        let info = &self.target_info;
        let mut pos = 0;
        while pos + 4 <= info.len() {
            let id = u16::from_le_bytes([info[pos], info[pos + 1]]);
            let len = u16::from_le_bytes([info[pos + 2], info[pos + 3]]) as usize;
            let value = info.get(pos + 4..pos + 4 + len)?;
            match id {
                MSV_AV_EOL => return None,
                MSV_AV_TIMESTAMP if len == 8 => {
                    let mut bytes = [0u8; 8];
                    bytes.copy_from_slice(value);
                    return Some(u64::from_le_bytes(bytes));
                }
                _ => pos += 4 + len,
            }
        }
        None
    }
}

/// `NTLM <base64>` header value carrying the NEGOTIATE message
pub fn negotiate_header() -> String {
    format!("NTLM {}", STANDARD.encode(negotiate_message()))
}

pub fn negotiate_message() -> Vec<u8> {
    let mut msg = Vec::with_capacity(32);
    msg.extend_from_slice(SIGNATURE);
    msg.extend_from_slice(&1u32.to_le_bytes());
    msg.extend_from_slice(&NEGOTIATE_FLAGS.to_le_bytes());
    // empty domain and workstation security buffers
    msg.extend_from_slice(&[0u8; 16]);
    msg
}

/// Find the NTLM challenge among `WWW-Authenticate` header values
pub fn challenge_from_headers<'a, I>(values: I) -> Result<Challenge>
where
    I: IntoIterator<Item = &'a str>,
{
    let token = values
        .into_iter()
        .find_map(|value| {
            let value = value.trim();
            let (scheme, rest) = value.split_once(' ')?;
            scheme.eq_ignore_ascii_case("NTLM").then(|| rest.trim())
        })
        .ok_or_else(|| ToolError::Auth("server did not send an NTLM challenge".to_string()))?;

    let bytes = STANDARD
        .decode(token)
        .map_err(|e| ToolError::Auth(format!("challenge is not valid base64: {}", e)))?;
    parse_challenge(&bytes)
}

pub fn parse_challenge(bytes: &[u8]) -> Result<Challenge> {
    if bytes.len() < 32 || &bytes[..8] != SIGNATURE {
        return Err(ToolError::Auth("malformed challenge message".to_string()));
    }
    if read_u32(bytes, 8) != 2 {
        return Err(ToolError::Auth(format!(
            "expected challenge message type 2, got {}",
            read_u32(bytes, 8)
        )));
    }

    let flags = read_u32(bytes, 20);
    let mut server_challenge = [0u8; 8];
    server_challenge.copy_from_slice(&bytes[24..32]);

    let target_info = if bytes.len() >= 48 {
        let len = read_u16(bytes, 40) as usize;
        let offset = read_u32(bytes, 44) as usize;
        bytes
            .get(offset..offset + len)
            .ok_or_else(|| ToolError::Auth("target info outside challenge message".to_string()))?
            .to_vec()
    } else {
        Vec::new()
    };

    Ok(Challenge {
        flags,
        server_challenge,
        target_info,
    })
}

/// `NTLM <base64>` header value answering `challenge`
pub fn authenticate_header(credentials: &NtlmCredentials, challenge: &Challenge) -> Result<String> {
    let client_challenge: [u8; 8] = rand::random();
    let message = authenticate_message(credentials, challenge, client_challenge, current_filetime())?;
    Ok(format!("NTLM {}", STANDARD.encode(message)))
}

pub fn authenticate_message(
    credentials: &NtlmCredentials,
    challenge: &Challenge,
    client_challenge: [u8; 8],
    now: u64,
) -> Result<Vec<u8>> {
    let response_key = ntowf_v2(&credentials.password, &credentials.username, &credentials.domain)?;

    let server_timestamp = challenge.timestamp();
    let timestamp = server_timestamp.unwrap_or(now);

    let mut blob = Vec::with_capacity(32 + challenge.target_info.len());
    blob.extend_from_slice(&[0x01, 0x01, 0x00, 0x00]);
    blob.extend_from_slice(&[0u8; 4]);
    blob.extend_from_slice(&timestamp.to_le_bytes());
    blob.extend_from_slice(&client_challenge);
    blob.extend_from_slice(&[0u8; 4]);
    blob.extend_from_slice(&challenge.target_info);
    blob.extend_from_slice(&[0u8; 4]);

    let nt_proof = hmac_md5(&response_key, &[&challenge.server_challenge[..], &blob[..]])?;
    let mut nt_response = nt_proof.to_vec();
    nt_response.extend_from_slice(&blob);

    // LMv2 is omitted when the server supplied its own timestamp
    let lm_response = if server_timestamp.is_some() {
        vec![0u8; 24]
    } else {
        let mut lm = hmac_md5(&response_key, &[&challenge.server_challenge[..], &client_challenge[..]])?.to_vec();
        lm.extend_from_slice(&client_challenge);
        lm
    };

    let unicode = challenge.flags & NEGOTIATE_UNICODE != 0;
    let domain = encode_string(&credentials.domain, unicode);
    let user = encode_string(&credentials.username, unicode);
    let workstation = encode_string(&credentials.workstation, unicode);

    let flags = (challenge.flags & NEGOTIATE_FLAGS) | NEGOTIATE_NTLM;
    let payloads: [&[u8]; 6] = [
        lm_response.as_slice(),
        nt_response.as_slice(),
        domain.as_slice(),
        user.as_slice(),
        workstation.as_slice(),
        &[],
    ];

    let header_len = 64u32;
    let mut msg = Vec::with_capacity(header_len as usize + payloads.iter().map(|p| p.len()).sum::<usize>());
    msg.extend_from_slice(SIGNATURE);
    msg.extend_from_slice(&3u32.to_le_bytes());

    let mut offset = header_len;
    for payload in payloads {
        let len = payload.len() as u16;
        msg.extend_from_slice(&len.to_le_bytes());
        msg.extend_from_slice(&len.to_le_bytes());
        msg.extend_from_slice(&offset.to_le_bytes());
        offset += payload.len() as u32;
    }
    msg.extend_from_slice(&flags.to_le_bytes());

    for payload in payloads {
        msg.extend_from_slice(payload);
    }
    Ok(msg)
}

/// MD4 of the UTF-16LE password
pub fn nt_hash(password: &str) -> [u8; 16] {
    let digest = Md4::digest(utf16le(password));
    let mut hash = [0u8; 16];
    hash.copy_from_slice(&digest);
    hash
}

/// NTLMv2 response key: HMAC-MD5 over the upper-cased user and the domain
pub fn ntowf_v2(password: &str, username: &str, domain: &str) -> Result<[u8; 16]> {
    let identity = utf16le(&format!("{}{}", username.to_uppercase(), domain));
    hmac_md5(&nt_hash(password), &[identity.as_slice()])
}

fn hmac_md5(key: &[u8], parts: &[&[u8]]) -> Result<[u8; 16]> {
    let mut mac = <HmacMd5 as Mac>::new_from_slice(key)
        .map_err(|e| ToolError::Auth(format!("invalid HMAC key: {}", e)))?;
    for part in parts {
        mac.update(part);
    }
    let mut out = [0u8; 16];
    out.copy_from_slice(&mac.finalize().into_bytes());
    Ok(out)
}

fn encode_string(value: &str, unicode: bool) -> Vec<u8> {
    if unicode {
        utf16le(value)
    } else {
        value.as_bytes().to_vec()
    }
}

fn utf16le(value: &str) -> Vec<u8> {
    value.encode_utf16().flat_map(|unit| unit.to_le_bytes()).collect()
}

fn current_filetime() -> u64 {
    let since_epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() / 100)
        .unwrap_or(0) as u64;
    since_epoch + FILETIME_UNIX_OFFSET
}

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}
