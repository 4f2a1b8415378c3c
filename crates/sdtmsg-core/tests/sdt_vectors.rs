//! SDT decode vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::fs;

use sdtmsg_core::sdt::{JsonSdtCodec, SdtDecoder};
use sdtmsg_core::MessageError;

use vector_loader::TestVector;

fn load(name: &str) -> TestVector {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

/// Returns true when the vector expects an error (and it matched).
fn expect_code(v: &TestVector, err: Option<&MessageError>) -> bool {
    let Some(want) = &v.expect_error else {
        assert!(err.is_none(), "unexpected error {err:?}: vector={}", v.description);
        return false;
    };
    let e = err.unwrap_or_else(|| panic!("expected error: vector={}", v.description));
    assert_eq!(e.code().as_str(), want.code, "vector={}", v.description);
    true
}

#[test]
fn sdt_vectors() {
    let files = [
        "map_mixed.json",
        "stream_mixed.json",
        "unknown_value.json",
        "map_garbage.json",
        "map_given_stream.json",
    ];
    let codec = JsonSdtCodec::new();

    for f in files {
        let v = load(f);
        let raw = v.blob.decode();

        match v.target.as_str() {
            "map" => {
                let res = codec.decode_map(&raw);
                if expect_code(&v, res.as_ref().err()) {
                    continue;
                }
                let map = res.expect("expected ok map");
                let ex = v.expect.as_ref().expect("missing expect block");

                assert_eq!(
                    map.len() as u64,
                    ex["len"].as_u64().unwrap(),
                    "vector={}",
                    v.description
                );
                for (key, kind) in ex["kinds"].as_object().unwrap() {
                    let got = map.get(key).unwrap_or_else(|| panic!("missing key {key}"));
                    assert_eq!(
                        got.kind().as_str(),
                        kind.as_str().unwrap(),
                        "vector={}",
                        v.description
                    );
                }
                assert_eq!(
                    map.to_string(),
                    ex["display"].as_str().unwrap(),
                    "vector={}",
                    v.description
                );
            }
            "stream" => {
                let res = codec.decode_stream(&raw);
                if expect_code(&v, res.as_ref().err()) {
                    continue;
                }
                let stream = res.expect("expected ok stream");
                let ex = v.expect.as_ref().expect("missing expect block");

                assert_eq!(
                    stream.len() as u64,
                    ex["len"].as_u64().unwrap(),
                    "vector={}",
                    v.description
                );
                let kinds: Vec<&str> = stream.iter().map(|d| d.kind().as_str()).collect();
                let want: Vec<&str> = ex["kinds"]
                    .as_array()
                    .unwrap()
                    .iter()
                    .map(|k| k.as_str().unwrap())
                    .collect();
                assert_eq!(kinds, want, "vector={}", v.description);
                assert_eq!(
                    stream.to_string(),
                    ex["display"].as_str().unwrap(),
                    "vector={}",
                    v.description
                );
            }
            "data" => {
                let res = codec.decode_data(&raw);
                if expect_code(&v, res.as_ref().err()) {
                    continue;
                }
                let data = res.expect("expected ok value");
                let ex = v.expect.as_ref().expect("missing expect block");

                assert_eq!(
                    data.kind().as_str(),
                    ex["kind"].as_str().unwrap(),
                    "vector={}",
                    v.description
                );
                assert_eq!(
                    data.to_string(),
                    ex["display"].as_str().unwrap(),
                    "vector={}",
                    v.description
                );
            }
            other => panic!("unsupported target: {other}"),
        }
    }
}
