//! Decodes a short FAST market data stream and prints each message as FIX.
//!
//! Run with `RUST_LOG=fastfix_decoder=trace` to see per-field decoding.
use anyhow::Context;
use fastfix::prelude::*;
use tracing::{info, warn};

const SNAPSHOT_TEMPLATE: u32 = 120;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

fn templates() -> TemplateSet {
    TemplateSet::new().template(
        TemplateDef::new(SNAPSHOT_TEMPLATE)
            .with_name("MDIncRefresh")
            .field(FieldDef::string(35, "MsgType").with_operator(OperatorDef::constant("X")))
            .field(FieldDef::uint32(34, "MsgSeqNum").with_operator(OperatorDef::increment()))
            .field(FieldDef::uint64(52, "SendingTime").with_operator(OperatorDef::delta()))
            .field(FieldDef::sequence(
                268,
                "MDEntries",
                vec![
                    FieldDef::uint32(279, "MDUpdateAction")
                        .with_operator(OperatorDef::copy().with_value("0")),
                    FieldDef::string(55, "Symbol").with_operator(OperatorDef::copy()),
                    FieldDef::decimal(270, "MDEntryPx").with_decimal_operators(
                        Some(OperatorDef::copy().with_value("-2")),
                        Some(OperatorDef::delta()),
                    ),
                    FieldDef::int32(271, "MDEntrySize").with_operator(OperatorDef::delta()),
                ],
            )),
    )
}

/// Writes `count` updates, each one tick above the last.
fn sample_stream(count: u32) -> Vec<u8> {
    let mut encoder = FastEncoder::with_capacity(64);
    for n in 0..count {
        let first = n == 0;
        encoder.encode_pmap(&PresenceMap::from_bits(&[first, first]));
        if first {
            encoder.encode_uint(u64::from(SNAPSHOT_TEMPLATE));
            encoder.encode_uint(1);
        }
        encoder.encode_big_int(if first { 1_767_225_600_000 } else { 250 });
        encoder.encode_uint(1);
        // action copied, symbol only on the first update, exponent from its initial value
        encoder.encode_pmap(&PresenceMap::from_bits(&[false, first, false]));
        if first {
            encoder.encode_ascii("ESZ6");
        }
        encoder.encode_big_int(if first { 512_525 } else { 25 });
        encoder.encode_big_int(if first { 10 } else { 5 });
    }
    encoder.finish()
}

fn main() -> anyhow::Result<()> {
    init_logging();

    let store = TemplateStore::from_set(&templates()).context("loading templates")?;
    let config = EngineConfig::new().with_reset_policy(ResetPolicy::Manual);
    let mut engine = Engine::with_config(store, config);

    let stream = sample_stream(3);
    info!(bytes = stream.len(), "decoding FAST stream");

    let mut cursor = ByteCursor::new(&stream);
    while !cursor.is_empty() {
        match engine.decode(&mut cursor) {
            Ok(message) => info!("{message}"),
            Err(e) => {
                warn!(code = ?e.code(), "{e}");
                return Err(fastfix::Error::from(e).into());
            }
        }
    }
    Ok(())
}
