//! Block file decoding against real files on disk

use anyhow::Result;
use blockscript::block_file::BlockFile;
use blockscript::*;
use std::io::Write;
use tempfile::NamedTempFile;

const GENESIS_RECORD: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c0101000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000";

const GENESIS_HASH: &str = "6fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000";
const GENESIS_MERKLE_ROOT: &str = "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a";

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn framed(record: &[u8]) -> Vec<u8> {
    let mut out = BLOCK_MAGIC.to_vec();
    out.extend((record.len() as u32).to_le_bytes());
    out.extend_from_slice(record);
    out
}

fn write_file(bytes: &[u8]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    file.write_all(bytes)?;
    file.flush()?;
    Ok(file)
}

fn empty_block_header() -> BlockHeader {
    BlockHeader {
        version: 2,
        prev_block: DoubleHash([0xaa; 32]),
        merkle_root: DoubleHash([0xbb; 32]),
        timestamp: 1_400_000_000,
        bits: 0x1b0404cb,
        nonce: 42,
    }
}

#[test]
fn test_single_empty_block_on_disk() -> Result<()> {
    init_logging();
    let block = Block::new(empty_block_header(), vec![]);
    let file = write_file(&block.consensus_encode_to_vec())?;

    let mut bf = BlockFile::open(file.path())?;
    assert_eq!(bf.count(), 1);

    let decoded = bf.block_at(0)?;
    assert_eq!(decoded.header, empty_block_header());
    assert_eq!(decoded.tx_count(), 0);
    assert_eq!(decoded.hash, empty_block_header().block_hash());

    let err = bf.block_at(1).unwrap_err();
    assert!(matches!(err, ConsensusError::IndexOutOfRange { index: 1, count: 1 }));
    assert_eq!(err.to_string(), "Bad block index 1 (from 1 blocks)");
    Ok(())
}

#[test]
fn test_genesis_block() -> Result<()> {
    init_logging();
    let record = hex::decode(GENESIS_RECORD)?;
    assert_eq!(record.len(), 285);
    let file = write_file(&framed(&record))?;

    let mut bf = BlockFile::open(file.path())?;
    let genesis = bf.block_at(0)?;

    assert_eq!(genesis.hash.to_hex(), GENESIS_HASH);
    assert_eq!(genesis.header.version, 1);
    assert!(genesis.header.prev_block.is_zero());
    assert_eq!(genesis.header.merkle_root.to_string(), GENESIS_MERKLE_ROOT);
    assert_eq!(genesis.header.timestamp, 1231006505);
    assert_eq!(genesis.header.bits, 0x1d00ffff);
    assert_eq!(genesis.header.nonce, 2083236893);

    assert_eq!(genesis.tx_count(), 1);
    let coinbase = genesis.tx(0).expect("one transaction");
    assert!(coinbase.is_coinbase());
    assert_eq!(coinbase.block, Some(genesis.hash));
    // Single transaction: its hash is the merkle root
    assert_eq!(coinbase.hash, genesis.header.merkle_root);
    assert_eq!(coinbase.outputs[0].value, 5_000_000_000);
    assert_eq!(coinbase.inputs[0].sequence, SEQUENCE_FINAL);

    assert_eq!(genesis.record_bytes(), record);
    Ok(())
}

#[test]
fn test_several_blocks_random_access() -> Result<()> {
    let genesis = hex::decode(GENESIS_RECORD)?;
    let mut bytes = Vec::new();
    bytes.extend(Block::new(empty_block_header(), vec![]).consensus_encode_to_vec());
    bytes.extend(framed(&genesis));
    bytes.extend(Block::new(empty_block_header(), vec![]).consensus_encode_to_vec());
    let file = write_file(&bytes)?;

    let mut bf = BlockFile::open(file.path())?;
    assert_eq!(bf.offsets(), &[0, 89, 89 + 8 + 285]);
    assert_eq!(bf.block_at(1)?.hash.to_hex(), GENESIS_HASH);
    assert_eq!(bf.block_at(2)?.tx_count(), 0);
    assert_eq!(bf.block_at(1)?.tx_count(), 1);

    let hashes: Vec<String> = bf.blocks().map(|b| b.map(|b| b.hash.to_hex())).collect::<blockscript::Result<_>>()?;
    assert_eq!(hashes.len(), 3);
    assert_eq!(hashes[1], GENESIS_HASH);
    Ok(())
}

#[test]
fn test_bad_magic_file() -> Result<()> {
    let mut bytes = Block::new(empty_block_header(), vec![]).consensus_encode_to_vec();
    bytes[3] = 0x00;
    let file = write_file(&bytes)?;
    let err = BlockFile::open(file.path()).unwrap_err();
    assert!(matches!(err, ConsensusError::BadMagic { found: [0xf9, 0xbe, 0xb4, 0x00] }));
    Ok(())
}

#[test]
fn test_truncated_file() -> Result<()> {
    let genesis = hex::decode(GENESIS_RECORD)?;
    let mut bytes = framed(&genesis);
    bytes.truncate(200);
    let file = write_file(&bytes)?;
    assert!(BlockFile::open(file.path()).unwrap_err().is_truncated());
    Ok(())
}

#[test]
fn test_record_with_trailing_bytes_fails_on_decode() -> Result<()> {
    let mut record = Block::new(empty_block_header(), vec![]).record_bytes();
    record.extend([0u8; 3]);
    let file = write_file(&framed(&record))?;

    // The frame itself is well formed, so indexing succeeds
    let mut bf = BlockFile::open(file.path())?;
    assert_eq!(bf.count(), 1);
    let err = bf.block_at(0).unwrap_err();
    assert!(matches!(err, ConsensusError::FrameMismatch { declared: 84, consumed: 81 }));
    Ok(())
}

#[test]
fn test_iterator_continues_after_bad_block() -> Result<()> {
    let mut bad = Block::new(empty_block_header(), vec![]).record_bytes();
    bad.push(0xff);
    let mut bytes = framed(&bad);
    bytes.extend(Block::new(empty_block_header(), vec![]).consensus_encode_to_vec());
    let file = write_file(&bytes)?;

    let mut bf = BlockFile::open(file.path())?;
    let results: Vec<_> = bf.blocks().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_err());
    assert!(results[1].is_ok());
    Ok(())
}

#[test]
fn test_record_size_limit_from_config() -> Result<()> {
    let genesis = hex::decode(GENESIS_RECORD)?;
    let file = write_file(&framed(&genesis))?;
    let config = Config::from_json_str(r#"{"block": {"max_record_size": 200}}"#)?;

    let mut bf = BlockFile::open_with_limits(file.path(), config.block)?;
    assert!(matches!(bf.block_at(0).unwrap_err(), ConsensusError::LimitExceeded(_)));
    Ok(())
}

#[test]
fn test_serialized_block_uses_hex() -> Result<()> {
    let genesis = Block::decode_record(&hex::decode(GENESIS_RECORD)?)?;
    let json = serde_json::to_value(&genesis)?;
    assert_eq!(json["hash"], GENESIS_HASH);
    assert_eq!(json["header"]["merkle_root"], GENESIS_MERKLE_ROOT);
    assert_eq!(json["transactions"][0]["block"], GENESIS_HASH);
    assert_eq!(json["transactions"][0]["inputs"][0]["script"].as_str().map(|s| &s[..10]), Some("04ffff001d"));

    let back: Block = serde_json::from_value(json)?;
    assert_eq!(back, genesis);
    Ok(())
}
