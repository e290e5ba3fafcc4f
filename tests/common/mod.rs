#![allow(dead_code)]

use std::collections::{HashMap, HashSet};

use anyhow::{anyhow, bail, Result};
use ctc::{compile, CompileOptions};
use regex::Regex;

pub fn ir_for(src: &str) -> Result<String> {
    Ok(compile(src, &CompileOptions::default())?)
}

pub fn unoptimized_ir_for(src: &str) -> Result<String> {
    Ok(compile(src, &CompileOptions { optimize: false })?)
}

/// Execute emitted IR and return the printed values.
///
/// Arithmetic wraps like the 32-bit machine words the backend targets. Fails on
/// malformed lines, temporaries written twice, reads of unknown names, and
/// division by zero.
pub fn run_ir(ir: &str) -> Result<Vec<i32>> {
    let alloc = Regex::new(r"^(%v\d+) =l alloc4 4$")?;
    let copy = Regex::new(r"^(%t\d+) =w copy (-?\d+)$")?;
    let load = Regex::new(r"^(%t\d+) =w loadw (%v\d+)$")?;
    let arith = Regex::new(r"^(%t\d+) =w (add|sub|mul|div) (%t\d+), (%t\d+)$")?;
    let store = Regex::new(r"^storew (%t\d+), (%v\d+)$")?;
    let call = Regex::new(r"^call \$printf\(l \$fmt_int, \.\.\., w (%t\d+)\)$")?;

    let mut slots: HashMap<String, Option<i32>> = HashMap::new();
    let mut temps: HashMap<String, i32> = HashMap::new();
    let mut printed = Vec::new();

    for line in ir.lines() {
        let Some(instr) = line.strip_prefix('\t') else {
            continue;
        };
        if let Some(c) = alloc.captures(instr) {
            slots.insert(c[1].to_string(), None);
        } else if let Some(c) = copy.captures(instr) {
            define(&mut temps, &c[1], c[2].parse()?)?;
        } else if let Some(c) = load.captures(instr) {
            let value = slots
                .get(&c[2])
                .copied()
                .ok_or_else(|| anyhow!("load from unallocated slot {}", &c[2]))?
                .ok_or_else(|| anyhow!("load from unwritten slot {}", &c[2]))?;
            define(&mut temps, &c[1], value)?;
        } else if let Some(c) = arith.captures(instr) {
            let (a, b) = (temp(&temps, &c[3])?, temp(&temps, &c[4])?);
            let value = match &c[2] {
                "add" => a.wrapping_add(b),
                "sub" => a.wrapping_sub(b),
                "mul" => a.wrapping_mul(b),
                _ if b == 0 => bail!("division by zero at runtime"),
                _ => a.wrapping_div(b),
            };
            define(&mut temps, &c[1], value)?;
        } else if let Some(c) = store.captures(instr) {
            let value = temp(&temps, &c[1])?;
            let slot = slots
                .get_mut(&c[2])
                .ok_or_else(|| anyhow!("store to unallocated slot {}", &c[2]))?;
            *slot = Some(value);
        } else if let Some(c) = call.captures(instr) {
            printed.push(temp(&temps, &c[1])?);
        } else if instr == "ret 0" {
            return Ok(printed);
        } else {
            bail!("unrecognised instruction: {instr:?}");
        }
    }
    bail!("function has no return")
}

fn temp(temps: &HashMap<String, i32>, name: &str) -> Result<i32> {
    temps.get(name).copied().ok_or_else(|| anyhow!("read of undefined temporary {name}"))
}

fn define(temps: &mut HashMap<String, i32>, name: &str, value: i32) -> Result<()> {
    if temps.insert(name.to_string(), value).is_some() {
        bail!("temporary {name} assigned twice");
    }
    Ok(())
}

/// Temporaries in the order they are defined.
pub fn defined_temps(ir: &str) -> Vec<u32> {
    let def = Regex::new(r"(?m)^\t%t(\d+) =").expect("valid regex");
    def.captures_iter(ir).map(|c| c[1].parse().expect("numeric temp")).collect()
}

pub fn distinct<T: std::hash::Hash + Eq + Clone>(items: &[T]) -> bool {
    items.iter().cloned().collect::<HashSet<_>>().len() == items.len()
}
