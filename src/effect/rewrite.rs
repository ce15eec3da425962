// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
/*!
Vertex program rewrite.

Compiled vertex programs write their clip-space position in the stream's
convention.  Before loading, the assembly is patched so the position is written
to a temporary, corrected, and only then moved to the real output register.

The compiled text is split into

```text
!!ARBvp1.0                     <- declaration line
# ... parameter listing ...    <- leading comment block, kept verbatim
PARAM c[4] = { ... };          <- instruction body
...
END                            <- terminator
```

and reassembled as declaration, comments, two helper declarations, the body with
every `result.position` renamed, the correction instructions selected by
[`ClipSpaceConvention`], the final move, and a fresh `END`.

The helper constant lives in a program environment slot shared by every vertex
program and is refreshed on each viewport change with
`(1 / width, -1 / height, 2, 0)`.
*/

use crate::config::ClipSpaceConvention;

const OUTPUT_POSITION: &str = "result.position";
const POSITION_TEMP: &str = "$hpos";
const HELPER_PARAM: &str = "$clip_helper";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("no program declaration line")]
    MissingDeclaration,
    #[error("program has no instructions after the comment block at byte {position}")]
    NoInstructions { position: usize },
    #[error("program has no END token after byte {position}")]
    MissingEnd { position: usize },
}

/// The pieces of a compiled vertex program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramParts<'a> {
    pub declaration: &'a str,
    pub comments: &'a str,
    pub instructions: &'a str,
}

impl<'a> ProgramParts<'a> {
    pub fn split(source: &'a str) -> Result<Self, RewriteError> {
        let declaration_end = source.find('\n').ok_or(RewriteError::MissingDeclaration)? + 1;
        if !source.starts_with("!!") {
            return Err(RewriteError::MissingDeclaration);
        }
        let mut body_start = declaration_end;
        while body_start < source.len() && source[body_start..].starts_with('#') {
            body_start = match source[body_start..].find('\n') {
                Some(newline) => body_start + newline + 1,
                None => source.len(),
            };
        }
        if body_start >= source.len() {
            return Err(RewriteError::NoInstructions {
                position: declaration_end,
            });
        }
        let end = Self::find_end(source, body_start).ok_or(RewriteError::MissingEnd {
            position: body_start,
        })?;
        Ok(ProgramParts {
            declaration: &source[..declaration_end],
            comments: &source[declaration_end..body_start],
            instructions: &source[body_start..end],
        })
    }

    /// Byte offset of the `END` line at or after `from`.
    fn find_end(source: &str, from: usize) -> Option<usize> {
        let mut line_start = from;
        for line in source[from..].split_inclusive('\n') {
            if line.trim_end() == "END" {
                return Some(line_start);
            }
            line_start += line.len();
        }
        None
    }
}

/// Patches compiled vertex program assembly to the native clip-space convention.
pub fn rewrite_vertex_program(
    source: &str,
    convention: ClipSpaceConvention,
    helper_env_index: u32,
) -> Result<String, RewriteError> {
    let parts = ProgramParts::split(source)?;
    let instructions = parts.instructions.replace(OUTPUT_POSITION, POSITION_TEMP);

    let mut out = String::with_capacity(source.len() + 256);
    out.push_str(parts.declaration);
    out.push_str(parts.comments);
    // helper.xy = (1/width, -1/height), helper.z = 2
    out.push_str(&format!(
        "PARAM {HELPER_PARAM} = program.env[{helper_env_index}];\n"
    ));
    out.push_str(&format!("TEMP {POSITION_TEMP};\n"));
    out.push_str(&instructions);
    if convention.half_pixel_offset {
        // hpos.xy += helper.xy * hpos.w
        out.push_str(&format!(
            "MAD {POSITION_TEMP}.xy, {HELPER_PARAM}.xyyy, {POSITION_TEMP}.w, {POSITION_TEMP}.xyyy;\n"
        ));
    }
    if convention.depth_remap {
        // hpos.z = hpos.z * 2 - hpos.w
        out.push_str(&format!(
            "MAD {POSITION_TEMP}.z, {POSITION_TEMP}.z, {HELPER_PARAM}.z, -{POSITION_TEMP}.w;\n"
        ));
    }
    out.push_str(&format!("MOV {OUTPUT_POSITION}, {POSITION_TEMP};\n"));
    out.push_str("END\n");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const COMPILED: &str = "!!ARBvp1.0\n\
# profile arbvp1\n\
#var float4x4 transform :  : c[0], 4 : -1 : 1\n\
PARAM c[4] = { program.local[0..3] };\n\
DP4 result.position.x, vertex.attrib[0], c[0];\n\
MOV result.position.yzw, vertex.attrib[0];\n\
END\n\
# 2 instructions, 0 R-regs\n";

    #[test]
    fn splits_program() {
        let parts = ProgramParts::split(COMPILED).unwrap();
        assert_eq!(parts.declaration, "!!ARBvp1.0\n");
        assert_eq!(
            parts.comments,
            "# profile arbvp1\n#var float4x4 transform :  : c[0], 4 : -1 : 1\n"
        );
        assert!(parts.instructions.starts_with("PARAM c[4]"));
        assert!(parts.instructions.ends_with("vertex.attrib[0];\n"));
    }

    #[test]
    fn full_rewrite() {
        let rewritten = rewrite_vertex_program(COMPILED, ClipSpaceConvention::D3D_ON_GL, 0).unwrap();
        assert_eq!(
            rewritten,
            "!!ARBvp1.0\n\
# profile arbvp1\n\
#var float4x4 transform :  : c[0], 4 : -1 : 1\n\
PARAM $clip_helper = program.env[0];\n\
TEMP $hpos;\n\
PARAM c[4] = { program.local[0..3] };\n\
DP4 $hpos.x, vertex.attrib[0], c[0];\n\
MOV $hpos.yzw, vertex.attrib[0];\n\
MAD $hpos.xy, $clip_helper.xyyy, $hpos.w, $hpos.xyyy;\n\
MAD $hpos.z, $hpos.z, $clip_helper.z, -$hpos.w;\n\
MOV result.position, $hpos;\n\
END\n"
        );
    }

    #[test]
    fn native_convention_only_moves() {
        let rewritten = rewrite_vertex_program(COMPILED, ClipSpaceConvention::NATIVE, 3).unwrap();
        assert!(rewritten.contains("program.env[3]"));
        assert!(!rewritten.contains("MAD"));
        assert!(rewritten.ends_with("MOV result.position, $hpos;\nEND\n"));
    }

    #[test]
    fn malformed_programs() {
        assert_eq!(
            rewrite_vertex_program("!!ARBvp1.0", ClipSpaceConvention::NATIVE, 0),
            Err(RewriteError::MissingDeclaration)
        );
        assert_eq!(
            rewrite_vertex_program("MOV a, b;\nEND\n", ClipSpaceConvention::NATIVE, 0),
            Err(RewriteError::MissingDeclaration)
        );
        assert_eq!(
            rewrite_vertex_program("!!ARBvp1.0\n# only\n# comments\n", ClipSpaceConvention::NATIVE, 0),
            Err(RewriteError::NoInstructions { position: 11 })
        );
        assert_eq!(
            rewrite_vertex_program("!!ARBvp1.0\nMOV result.position, c[0];\n", ClipSpaceConvention::NATIVE, 0),
            Err(RewriteError::MissingEnd { position: 11 })
        );
    }
}
