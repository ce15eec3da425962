// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Compiler for the effect language accepted by [`SoftDevice`](super::SoftDevice).

The language is a small C-like subset: global declarations and functions.

```text
uniform float4x4 worldViewProj;
float4 tint;
sampler2D diffuse;

float4 vs_main(float4 position : POSITION) : POSITION {
    return mul(position, worldViewProj);
}

float4 ps_main(float2 uv : TEXCOORD0) : COLOR {
    return tex2D(diffuse, uv) * tint;
}
```

Globals are uniform.  An entry point's parameters are varying unless marked
`uniform`.  Function bodies are not type checked; the generated program reads
its position or color input, applies the first referenced matrix or color, and
samples every referenced sampler.  A body of the form `asm { ... }` is emitted
verbatim instead, one statement per line.

The output is ARB-style assembly.  Every parameter is listed in a leading
comment block:

```text
#var <type> <name> : <semantic> : <resource> : <index> : 1
```

where the semantic is `$vin.<SEM>` for varying inputs, `$vout.<SEM>` for
outputs and empty for uniforms.
*/

use super::assembler;
use crate::device::{DeviceError, ShaderStage};
use std::collections::HashSet;
use std::fmt::Write;

const TYPES: &[&str] = &[
    "void", "float", "float2", "float3", "float4", "half", "half2", "half3", "half4", "float2x2",
    "float3x3", "float4x4", "int", "bool", "sampler", "sampler1D", "sampler2D", "sampler3D",
    "samplerCUBE",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Qualifier {
    In,
    Out,
    Uniform,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Declaration {
    ty: String,
    name: String,
    semantic: Option<String>,
    qualifier: Qualifier,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Function {
    return_type: String,
    name: String,
    params: Vec<Declaration>,
    semantic: Option<String>,
    body: String,
}

#[derive(Debug, Default)]
struct Module {
    globals: Vec<Declaration>,
    functions: Vec<Function>,
}

fn compile_error(source: &str, offset: usize, message: impl std::fmt::Display) -> DeviceError {
    let line = source[..offset.min(source.len())].matches('\n').count() + 1;
    DeviceError::Compile(format!("line {line}: {message}"))
}

/// Replaces comments with spaces, keeping byte offsets and newlines.
fn strip_comments(source: &str) -> String {
    let bytes = source.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i..].starts_with(b"//") {
            while i < bytes.len() && bytes[i] != b'\n' {
                out.push(b' ');
                i += 1;
            }
        } else if bytes[i..].starts_with(b"/*") {
            let end = source[i + 2..].find("*/").map_or(bytes.len(), |e| i + 2 + e + 2);
            while i < end {
                out.push(if bytes[i] == b'\n' { b'\n' } else { b' ' });
                i += 1;
            }
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    // whole comments become spaces, so no character is split
    String::from_utf8_lossy(&out).into_owned()
}

fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Splits `text : SEMANTIC` into the declaration and its semantic.
fn split_semantic(text: &str) -> (&str, Option<String>) {
    match text.split_once(':') {
        Some((decl, semantic)) => (decl, Some(semantic.trim().to_string())),
        None => (text, None),
    }
}

/// Parses `[qualifiers] type name [: SEMANTIC]`.  `None` for declarations that
/// are not parameters (`static`, `const`).
fn parse_declaration(text: &str, default: Qualifier) -> Result<Option<Declaration>, String> {
    let (decl, semantic) = split_semantic(text);
    let decl = decl.split('=').next().unwrap_or(decl);
    let mut qualifier = default;
    let mut words = Vec::new();
    for word in decl.split_whitespace() {
        match word {
            "static" | "const" => return Ok(None),
            "uniform" => qualifier = Qualifier::Uniform,
            "in" => qualifier = Qualifier::In,
            "out" | "inout" => qualifier = Qualifier::Out,
            "extern" => {}
            _ => words.push(word),
        }
    }
    let [ty, name] = words.as_slice() else {
        return Err(format!("expected a type and a name in `{}`", decl.trim()));
    };
    if !TYPES.contains(ty) || *ty == "void" {
        return Err(format!("unknown type {ty}"));
    }
    if !is_identifier(name) {
        return Err(format!("bad name {name}"));
    }
    if matches!(&semantic, Some(s) if !is_identifier(s)) {
        return Err(format!("bad semantic on {name}"));
    }
    Ok(Some(Declaration {
        ty: ty.to_string(),
        name: name.to_string(),
        semantic,
        qualifier,
    }))
}

fn parse_function(header: &str, body: &str) -> Result<Function, String> {
    let open = header.find('(').ok_or("expected '('")?;
    let close = header.rfind(')').ok_or("expected ')'")?;
    if close < open {
        return Err("mismatched parentheses".to_string());
    }
    let signature: Vec<&str> = header[..open].split_whitespace().collect();
    let [return_type, name] = signature.as_slice() else {
        return Err("expected a return type and a function name".to_string());
    };
    if !TYPES.contains(return_type) {
        return Err(format!("unknown return type {return_type}"));
    }
    if !is_identifier(name) {
        return Err(format!("bad function name {name}"));
    }
    let rest = header[close + 1..].trim();
    let semantic = match rest.strip_prefix(':') {
        Some(semantic) => Some(semantic.trim().to_string()),
        None if rest.is_empty() => None,
        None => return Err(format!("unexpected `{rest}` after parameter list")),
    };
    let params_text = header[open + 1..close].trim();
    let mut params = Vec::new();
    if !params_text.is_empty() {
        for text in params_text.split(',') {
            if let Some(param) = parse_declaration(text, Qualifier::In)? {
                params.push(param);
            }
        }
    }
    Ok(Function {
        return_type: return_type.to_string(),
        name: name.to_string(),
        params,
        semantic,
        body: body.to_string(),
    })
}

fn parse(source: &str) -> Result<Module, DeviceError> {
    let text = strip_comments(source);
    let mut module = Module::default();
    let mut at = 0;
    loop {
        let rest = &text[at..];
        let skipped = rest.len() - rest.trim_start().len();
        at += skipped;
        if at >= text.len() {
            break;
        }
        let rest = &text[at..];
        let Some(stop) = rest.find([';', '{']) else {
            return Err(compile_error(source, at, "expected ';' or '{'"));
        };
        if rest.as_bytes()[stop] == b';' {
            if let Some(global) =
                parse_declaration(&rest[..stop], Qualifier::Uniform).map_err(|m| compile_error(source, at, m))?
            {
                module.globals.push(global);
            }
            at += stop + 1;
            continue;
        }
        let mut depth = 0usize;
        let mut close = None;
        for (i, c) in rest[stop..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        close = Some(stop + i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let close = close.ok_or_else(|| compile_error(source, at, "unbalanced braces"))?;
        let function = parse_function(&rest[..stop], &rest[stop + 1..close]).map_err(|m| compile_error(source, at, m))?;
        if module.functions.iter().any(|f| f.name == function.name) {
            return Err(compile_error(source, at, format!("{} defined twice", function.name)));
        }
        module.functions.push(function);
        at += close + 1;
        // tolerate `};`
        if text[at..].starts_with(';') {
            at += 1;
        }
    }
    Ok(module)
}

fn identifiers(body: &str) -> HashSet<&str> {
    body.split(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .filter(|w| is_identifier(w))
        .collect()
}

fn registers(ty: &str) -> u32 {
    match ty {
        "float4x4" => 4,
        "float3x3" => 3,
        "float2x2" => 2,
        _ => 1,
    }
}

fn is_sampler(ty: &str) -> bool {
    ty.starts_with("sampler")
}

fn texture_target(ty: &str) -> &'static str {
    match ty {
        "sampler1D" => "1D",
        "sampler3D" => "3D",
        "samplerCUBE" => "CUBE",
        _ => "2D",
    }
}

/// Attribute register read for a vertex input semantic.
fn vertex_attrib(semantic: &str) -> u32 {
    let digits = semantic.trim_start_matches(|c: char| !c.is_ascii_digit());
    let index: u32 = digits.parse().unwrap_or(0);
    let base = semantic.trim_end_matches(|c: char| c.is_ascii_digit());
    match base {
        "NORMAL" => 2,
        "COLOR" => 3 + index.min(1),
        "TEXCOORD" => 8 + index.min(7),
        _ => 0,
    }
}

/// A uniform with its assigned resource.
struct Uniform<'a> {
    decl: &'a Declaration,
    /// First constant register, or texture unit for samplers.
    slot: u32,
    index: i32,
}

/// Compiles `entry_point` of `source` for `stage`.
pub fn compile(stage: ShaderStage, source: &str, entry_point: &str) -> Result<String, DeviceError> {
    let module = parse(source)?;
    let function = module
        .functions
        .iter()
        .find(|f| f.name == entry_point)
        .ok_or_else(|| DeviceError::Compile(format!("entry point {entry_point} not found")))?;
    let used = identifiers(&function.body);

    let mut uniforms = Vec::new();
    let (mut next_register, mut next_unit) = (0u32, 0u32);
    let candidates = module
        .globals
        .iter()
        .filter(|g| used.contains(g.name.as_str()))
        .map(|g| (g, -1))
        .chain(
            function
                .params
                .iter()
                .enumerate()
                .filter(|(_, p)| p.qualifier == Qualifier::Uniform)
                .map(|(i, p)| (p, i as i32)),
        );
    for (decl, index) in candidates {
        let slot = if is_sampler(&decl.ty) {
            next_unit += 1;
            next_unit - 1
        } else {
            next_register += registers(&decl.ty);
            next_register - registers(&decl.ty)
        };
        uniforms.push(Uniform { decl, slot, index });
    }

    let mut out = String::new();
    let profile = match stage {
        ShaderStage::Vertex => "arbvp1",
        ShaderStage::Fragment => "arbfp1",
    };
    // writing to a String can't fail
    let _ = writeln!(out, "{}", assembler::header(stage));
    let _ = writeln!(out, "# profile {profile}");
    let _ = writeln!(out, "# program {entry_point}");
    for uniform in &uniforms {
        let resource = if is_sampler(&uniform.decl.ty) {
            format!("texunit {}", uniform.slot)
        } else {
            format!("c[{}], {}", uniform.slot, registers(&uniform.decl.ty))
        };
        let _ = writeln!(
            out,
            "#var {} {} :  : {resource} : {} : 1",
            uniform.decl.ty, uniform.decl.name, uniform.index
        );
    }
    for (i, param) in function.params.iter().enumerate() {
        if param.qualifier == Qualifier::Uniform {
            continue;
        }
        let semantic = param.semantic.as_deref().unwrap_or("");
        let (direction, resource) = match (param.qualifier, stage) {
            (Qualifier::Out, _) => ("$vout", semantic.to_string()),
            (_, ShaderStage::Vertex) => ("$vin", format!("ATTR{}", vertex_attrib(semantic))),
            (_, ShaderStage::Fragment) => ("$vin", semantic.to_string()),
        };
        let _ = writeln!(
            out,
            "#var {} {} : {direction}.{semantic} : {resource} : {i} : 1",
            param.ty, param.name
        );
    }
    if let Some(semantic) = &function.semantic {
        let _ = writeln!(
            out,
            "#var {} {} : $vout.{semantic} : {semantic} : -1 : 1",
            function.return_type, function.name
        );
    }

    if next_register > 0 {
        let _ = writeln!(out, "PARAM c[{next_register}] = {{ program.local[0..{}] }};", next_register - 1);
    }
    if let Some(statements) = inline_assembly(&function.body) {
        for statement in statements {
            let _ = writeln!(out, "{statement};");
        }
    } else {
        match stage {
            ShaderStage::Vertex => emit_vertex(&mut out, &uniforms),
            ShaderStage::Fragment => emit_fragment(&mut out, &uniforms),
        }
    }
    let _ = writeln!(out, "END");
    Ok(out)
}

fn inline_assembly(body: &str) -> Option<Vec<&str>> {
    let inner = body
        .trim()
        .strip_prefix("asm")?
        .trim()
        .strip_prefix('{')?
        .strip_suffix('}')?;
    Some(
        inner
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect(),
    )
}

fn emit_vertex(out: &mut String, uniforms: &[Uniform<'_>]) {
    let _ = writeln!(out, "TEMP R0;");
    match uniforms.iter().find(|u| u.decl.ty == "float4x4") {
        Some(matrix) => {
            for (row, component) in ["x", "y", "z", "w"].iter().enumerate() {
                let _ = writeln!(
                    out,
                    "DP4 R0.{component}, vertex.attrib[0], c[{}];",
                    matrix.slot + row as u32
                );
            }
        }
        None => {
            let _ = writeln!(out, "MOV R0, vertex.attrib[0];");
        }
    }
    let _ = writeln!(out, "MOV result.position, R0;");
}

fn emit_fragment(out: &mut String, uniforms: &[Uniform<'_>]) {
    let samplers: Vec<&Uniform<'_>> = uniforms.iter().filter(|u| is_sampler(&u.decl.ty)).collect();
    let _ = writeln!(out, "TEMP R0;");
    if !samplers.is_empty() {
        let _ = writeln!(out, "TEMP R1;");
    }
    match uniforms.iter().find(|u| !is_sampler(&u.decl.ty)) {
        Some(color) => {
            let _ = writeln!(out, "MOV R0, c[{}];", color.slot);
        }
        None => {
            let _ = writeln!(out, "MOV R0, fragment.color;");
        }
    }
    for sampler in samplers {
        let _ = writeln!(
            out,
            "TEX R1, fragment.texcoord[0], texture[{}], {};",
            sampler.slot,
            texture_target(&sampler.decl.ty)
        );
        let _ = writeln!(out, "MUL R0, R0, R1;");
    }
    let _ = writeln!(out, "MOV result.color, R0;");
}
