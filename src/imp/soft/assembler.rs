// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Validating assembler for ARB-style program text.
//!
//! Nothing is executed.  The assembler checks that a program is well formed
//! enough that a driver would accept it, and recovers the parameter listing the
//! compiler leaves in `#var` comments.
//!
//! Checks: the header matches the stage, every statement ends in `;`, opcodes
//! are known, every register name is declared before use, and the program ends
//! with `END`.  Errors carry the byte offset of the offending line.

use crate::device::{Direction, NativeParamType, ProgramError, ShaderStage, Variability};
use std::collections::HashSet;

const OPCODES: &[&str] = &[
    "ABS", "ADD", "ARL", "CMP", "COS", "DP3", "DP4", "DPH", "DST", "EX2", "EXP", "FLR", "FRC", "KIL",
    "LG2", "LIT", "LOG", "LRP", "MAD", "MAX", "MIN", "MOV", "MUL", "POW", "RCP", "RSQ", "SCS", "SGE",
    "SIN", "SLT", "SUB", "SWZ", "TEX", "TXB", "TXP", "XPD",
];

const DECLARATIONS: &[&str] = &["PARAM", "TEMP", "ATTRIB", "OUTPUT", "ADDRESS", "ALIAS"];

const BUILTINS: &[&str] = &["vertex", "fragment", "result", "program", "state", "texture"];

const TEXTURE_TARGETS: &[&str] = &["1D", "2D", "3D", "CUBE", "RECT"];

/// A parameter recovered from a `#var` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectedParam {
    pub name: String,
    pub ty: NativeParamType,
    pub variability: Variability,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledProgram {
    pub params: Vec<ReflectedParam>,
    pub instruction_count: usize,
}

pub fn header(stage: ShaderStage) -> &'static str {
    match stage {
        ShaderStage::Vertex => "!!ARBvp1.0",
        ShaderStage::Fragment => "!!ARBfp1.0",
    }
}

fn error(position: usize, message: impl Into<String>) -> ProgramError {
    ProgramError {
        position,
        message: message.into(),
    }
}

pub fn assemble(stage: ShaderStage, text: &str) -> Result<AssembledProgram, ProgramError> {
    let mut lines = text.split_inclusive('\n').scan(0usize, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line.trim()))
    });
    match lines.next() {
        Some((_, first)) if first == header(stage) => {}
        _ => return Err(error(0, format!("expected {}", header(stage)))),
    }

    let mut declared: HashSet<String> = HashSet::new();
    let mut params = Vec::new();
    let mut instruction_count = 0;
    let mut ended = false;
    for (position, line) in lines {
        if line.is_empty() {
            continue;
        }
        if let Some(comment) = line.strip_prefix('#') {
            if let Some(param) = comment.strip_prefix("var ").and_then(parse_var) {
                params.push(param);
            }
            continue;
        }
        if ended {
            return Err(error(position, "text after END"));
        }
        if line == "END" {
            ended = true;
            continue;
        }
        let statement = line
            .strip_suffix(';')
            .ok_or_else(|| error(position, "expected ';'"))?
            .trim();
        let (keyword, operands) = statement
            .split_once(char::is_whitespace)
            .map(|(k, o)| (k, o.trim()))
            .unwrap_or((statement, ""));
        if keyword == "OPTION" {
            continue;
        }
        if DECLARATIONS.contains(&keyword) {
            declare(keyword, operands, &mut declared).map_err(|m| error(position, m))?;
            continue;
        }
        let opcode = keyword.strip_suffix("_SAT").unwrap_or(keyword);
        if !OPCODES.contains(&opcode) {
            return Err(error(position, format!("unknown opcode {keyword}")));
        }
        check_operands(opcode, operands, &declared).map_err(|m| error(position, m))?;
        instruction_count += 1;
    }
    if !ended {
        return Err(error(text.len(), "missing END"));
    }
    Ok(AssembledProgram {
        params,
        instruction_count,
    })
}

fn declare(keyword: &str, operands: &str, declared: &mut HashSet<String>) -> Result<(), String> {
    let names = match keyword {
        // PARAM name = binding;  PARAM name[n] = { ... };
        "PARAM" | "ATTRIB" | "OUTPUT" | "ALIAS" => {
            let (name, _) = operands
                .split_once('=')
                .ok_or_else(|| format!("{keyword} needs a binding"))?;
            vec![name.trim()]
        }
        _ => operands.split(',').map(str::trim).collect(),
    };
    for name in names {
        let name = name.split('[').next().unwrap_or(name).trim();
        if !is_identifier(name) {
            return Err(format!("bad name in {keyword}: {name}"));
        }
        if !declared.insert(name.to_string()) {
            return Err(format!("{name} declared twice"));
        }
    }
    Ok(())
}

fn check_operands(opcode: &str, operands: &str, declared: &HashSet<String>) -> Result<(), String> {
    if opcode == "KIL" && operands.is_empty() {
        return Err("KIL needs an operand".to_string());
    }
    let operands: Vec<&str> = operands.split(',').map(str::trim).collect();
    for (index, operand) in operands.iter().enumerate() {
        let operand = operand.trim_start_matches(['-', '|']);
        if operand.is_empty() {
            return Err(format!("{opcode} has an empty operand"));
        }
        if operand.starts_with(|c: char| c.is_ascii_digit() || c == '{' || c == '.') || operand.ends_with('}') {
            let is_target = opcode.starts_with('T') && index == operands.len() - 1;
            if is_target && !TEXTURE_TARGETS.contains(&operand) {
                return Err(format!("unknown texture target {operand}"));
            }
            continue;
        }
        if opcode.starts_with('T') && index == operands.len() - 1 && TEXTURE_TARGETS.contains(&operand) {
            continue;
        }
        let name: String = operand
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '$')
            .collect();
        if !BUILTINS.contains(&name.as_str()) && !declared.contains(&name) {
            return Err(format!("undeclared identifier {name}"));
        }
    }
    Ok(())
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Parses the body of `#var <type> <name> : <semantic> : <resource> : <index> : <used>`.
fn parse_var(line: &str) -> Option<ReflectedParam> {
    let mut fields = line.split(':').map(str::trim);
    let mut head = fields.next()?.split_whitespace();
    let ty = head.next()?;
    let name = head.next()?;
    let semantic = fields.next()?;
    let (variability, direction) = if semantic.starts_with("$vin.") {
        (Variability::Varying, Direction::In)
    } else if semantic.starts_with("$vout.") {
        (Variability::Varying, Direction::Out)
    } else {
        (Variability::Uniform, Direction::In)
    };
    Some(ReflectedParam {
        name: name.to_string(),
        ty: param_type(ty),
        variability,
        direction,
    })
}

fn param_type(ty: &str) -> NativeParamType {
    match ty {
        "float" | "half" => NativeParamType::Float1,
        "float2" | "half2" => NativeParamType::Float2,
        "float3" | "half3" => NativeParamType::Float3,
        "float4" | "half4" => NativeParamType::Float4,
        "float4x4" => NativeParamType::Float4x4,
        "int" => NativeParamType::Int,
        "bool" => NativeParamType::Bool,
        t if t.starts_with("sampler") => NativeParamType::Sampler,
        _ => NativeParamType::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "!!ARBvp1.0\n\
# profile arbvp1\n\
#var float4x4 mvp :  : c[0], 4 : -1 : 1\n\
#var float4 position : $vin.POSITION : ATTR0 : 0 : 1\n\
PARAM c[4] = { program.local[0..3] };\n\
TEMP R0;\n\
DP4 R0.x, vertex.attrib[0], c[0];\n\
MOV result.position, R0;\n\
END\n\
# 2 instructions\n";

    #[test]
    fn accepts_program_and_reflects_vars() {
        let program = assemble(ShaderStage::Vertex, VERTEX).unwrap();
        assert_eq!(program.instruction_count, 2);
        assert_eq!(
            program.params,
            vec![
                ReflectedParam {
                    name: "mvp".to_string(),
                    ty: NativeParamType::Float4x4,
                    variability: Variability::Uniform,
                    direction: Direction::In,
                },
                ReflectedParam {
                    name: "position".to_string(),
                    ty: NativeParamType::Float4,
                    variability: Variability::Varying,
                    direction: Direction::In,
                },
            ]
        );
    }

    #[test]
    fn wrong_stage_header() {
        let err = assemble(ShaderStage::Fragment, VERTEX).unwrap_err();
        assert_eq!(err.position, 0);
    }

    #[test]
    fn undeclared_register_reports_line_offset() {
        let text = "!!ARBfp1.0\nTEMP R0;\nMOV R0, R1;\nEND\n";
        let err = assemble(ShaderStage::Fragment, text).unwrap_err();
        assert_eq!(err.position, 20);
        assert!(err.message.contains("R1"));
    }

    #[test]
    fn rejects_unknown_opcode_and_missing_end() {
        let text = "!!ARBfp1.0\nFOO result.color, fragment.color;\nEND\n";
        assert!(assemble(ShaderStage::Fragment, text).is_err());
        let text = "!!ARBfp1.0\nMOV result.color, fragment.color;\n";
        let err = assemble(ShaderStage::Fragment, text).unwrap_err();
        assert_eq!(err.position, text.len());
    }

    #[test]
    fn texture_targets() {
        let text = "!!ARBfp1.0\nTEMP R0;\nTEX R0, fragment.texcoord[0], texture[0], 2D;\nMOV result.color, R0;\nEND\n";
        assert!(assemble(ShaderStage::Fragment, text).is_ok());
        let bad = text.replace("2D", "4D");
        assert!(assemble(ShaderStage::Fragment, &bad).is_err());
    }
}
