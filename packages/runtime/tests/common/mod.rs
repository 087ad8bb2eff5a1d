//! Guest modules used by the integration tests.
//!
//! They follow the same calling convention as the real markup builds
//! (input at address 0, output written back at address 0, length returned)
//! with trivial transformations so expected outputs are easy to state.

#![allow(dead_code)]

use mdz_runtime::{ModuleSource, TransformConfig, Transformer};

/// `(addr, len) -> len` export that wraps the input in `<p>`/`</p>` and
/// reports `InvalidMDZSyntax` (after a partial `<p>` write) for input
/// starting with `[`.
const PARSE_MDZ: &str = r#"
  (data $open "<p>")
  (data $close "</p>")
  (data $mdz_err "<p>error.InvalidMDZSyntax")

  (func (export "parseMDZWasm") (param $addr i32) (param $len i32) (result i32)
    (if (i32.eqz (local.get $len))
      (then (return (i32.const 0))))
    (if (i32.eq (i32.load8_u (local.get $addr)) (i32.const 91))
      (then
        (memory.init $mdz_err (local.get $addr) (i32.const 0) (i32.const 25))
        (return (i32.const 25))))
    (memory.copy
      (i32.add (local.get $addr) (i32.const 3))
      (local.get $addr)
      (local.get $len))
    (memory.init $open (local.get $addr) (i32.const 0) (i32.const 3))
    (memory.init $close
      (i32.add (i32.add (local.get $addr) (i32.const 3)) (local.get $len))
      (i32.const 0)
      (i32.const 4))
    (i32.add (local.get $len) (i32.const 7)))
"#;

/// Lowercases ASCII letters, keeps digits and collapses every other run of
/// bytes into a single `-` between words.
const SLUGIFY: &str = r#"
  (func (export "slugifyWasm") (param $addr i32) (param $len i32) (result i32)
    (local $i i32) (local $out i32) (local $b i32) (local $dash i32)
    (block $done
      (loop $next
        (br_if $done (i32.ge_u (local.get $i) (local.get $len)))
        (local.set $b (i32.load8_u (i32.add (local.get $addr) (local.get $i))))
        (if (i32.and
              (i32.ge_u (local.get $b) (i32.const 65))
              (i32.le_u (local.get $b) (i32.const 90)))
          (then (local.set $b (i32.add (local.get $b) (i32.const 32)))))
        (if (i32.or
              (i32.and
                (i32.ge_u (local.get $b) (i32.const 97))
                (i32.le_u (local.get $b) (i32.const 122)))
              (i32.and
                (i32.ge_u (local.get $b) (i32.const 48))
                (i32.le_u (local.get $b) (i32.const 57))))
          (then
            (if (i32.and (local.get $dash) (i32.gt_u (local.get $out) (i32.const 0)))
              (then
                (i32.store8 (i32.add (local.get $addr) (local.get $out)) (i32.const 45))
                (local.set $out (i32.add (local.get $out) (i32.const 1)))))
            (local.set $dash (i32.const 0))
            (i32.store8 (i32.add (local.get $addr) (local.get $out)) (local.get $b))
            (local.set $out (i32.add (local.get $out) (i32.const 1))))
          (else (local.set $dash (i32.const 1))))
        (local.set $i (i32.add (local.get $i) (i32.const 1)))
        (br $next)))
    (local.get $out))
"#;

/// Prefix-style errors: the whole output is `error.InvalidRMDSyntax`.
const PARSE_RMD: &str = r#"
  (data $rmd_open "<p>")
  (data $rmd_close "</p>")
  (data $rmd_err "error.InvalidRMDSyntax")

  (func (export "parseRMDWasm") (param $addr i32) (param $len i32) (result i32)
    (if (i32.eqz (local.get $len))
      (then (return (i32.const 0))))
    (if (i32.eq (i32.load8_u (local.get $addr)) (i32.const 91))
      (then
        (memory.init $rmd_err (local.get $addr) (i32.const 0) (i32.const 22))
        (return (i32.const 22))))
    (memory.copy
      (i32.add (local.get $addr) (i32.const 3))
      (local.get $addr)
      (local.get $len))
    (memory.init $rmd_open (local.get $addr) (i32.const 0) (i32.const 3))
    (memory.init $rmd_close
      (i32.add (i32.add (local.get $addr) (i32.const 3)) (local.get $len))
      (i32.const 0)
      (i32.const 4))
    (i32.add (local.get $len) (i32.const 7)))
"#;

/// Emits `Line: <input>\n` and grows memory by one page on every call.
const PARSE_DJOT: &str = r#"
  (data $line "Line: ")

  (func (export "parseDjotWasm") (param $addr i32) (param $len i32) (result i32)
    (drop (memory.grow (i32.const 1)))
    (memory.copy
      (i32.add (local.get $addr) (i32.const 6))
      (local.get $addr)
      (local.get $len))
    (memory.init $line (local.get $addr) (i32.const 0) (i32.const 6))
    (i32.store8
      (i32.add (i32.add (local.get $addr) (i32.const 6)) (local.get $len))
      (i32.const 10))
    (i32.add (local.get $len) (i32.const 7)))
"#;

/// Wrap module fields with a one-page exported memory and assemble them.
pub fn module_with(fields: &[&str]) -> Vec<u8> {
    let wat = format!(
        "(module\n  (memory (export \"memory\") 1)\n{}\n)",
        fields.join("\n")
    );
    wat::parse_str(&wat).expect("Failed to parse WAT")
}

/// The MDZ build: parse + slugify
pub fn mdz_module() -> Vec<u8> {
    module_with(&[PARSE_MDZ, SLUGIFY])
}

pub fn rmd_module() -> Vec<u8> {
    module_with(&[PARSE_RMD])
}

pub fn djot_module() -> Vec<u8> {
    module_with(&[PARSE_DJOT])
}

/// A parse export with a custom body
pub fn parse_mdz_with_body(body: &str) -> Vec<u8> {
    let func = format!(
        "(func (export \"parseMDZWasm\") (param $addr i32) (param $len i32) (result i32)\n{}\n)",
        body
    );
    module_with(&[&func])
}

pub fn transformer(bytes: Vec<u8>) -> Transformer {
    transformer_with(TransformConfig::development(), bytes)
}

pub fn transformer_with(config: TransformConfig, bytes: Vec<u8>) -> Transformer {
    Transformer::with_config(config, ModuleSource::Bytes(bytes))
        .expect("Failed to create transformer")
}
