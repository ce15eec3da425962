// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use command_buffer_gapi::device::{IndexType, ShaderStage};
use command_buffer_gapi::error::Error;
use command_buffer_gapi::geometry::{BufferFlags, Semantic, VertexInput, VertexType};
use command_buffer_gapi::imp::DrawKind;
use command_buffer_gapi::render_state::PrimitiveType;
use command_buffer_gapi::resource::ResourceKind;
use command_buffer_gapi::{Gapi, GapiConfig, INVALID_RESOURCE, ParseError, ResourceId, SoftDevice};

const EFFECT: ResourceId = ResourceId(1);
const VERTICES: ResourceId = ResourceId(2);
const LAYOUT: ResourceId = ResourceId(3);
const INDICES: ResourceId = ResourceId(4);

const SOURCE: &str = "
float4 vs_main(float4 position : POSITION) : POSITION {
    return position;
}

float4 ps_main() : COLOR {
    return 1;
}
";

fn position(vertex_buffer: ResourceId, stride: u32) -> VertexInput {
    VertexInput {
        vertex_buffer,
        offset: 0,
        stride,
        ty: VertexType::Float3,
        semantic: Semantic::Position,
        semantic_index: 0,
    }
}

/// An engine with an effect and a ten-vertex position stream selected.
fn ready() -> Gapi<SoftDevice> {
    let mut gapi = Gapi::new(SoftDevice::new(64, 64), GapiConfig::default());
    gapi.initialize().unwrap();
    gapi.create_effect(EFFECT, format!("vs_main\0ps_main\0{SOURCE}").as_bytes())
        .unwrap();
    gapi.set_effect(EFFECT).unwrap();
    gapi.create_vertex_buffer(VERTICES, 120, BufferFlags::empty()).unwrap();
    gapi.create_vertex_struct(LAYOUT, 1).unwrap();
    gapi.set_vertex_input(LAYOUT, 0, position(VERTICES, 12)).unwrap();
    gapi.set_vertex_struct(LAYOUT).unwrap();
    gapi
}

#[test]
fn draw_must_fit_the_streams() {
    let mut gapi = ready();
    let result = gapi.draw(PrimitiveType::Triangles, 0, 4);
    assert!(matches!(result, Err(Error::Validation(_))));
    assert_eq!(ParseError::from_result(&result), ParseError::InvalidArguments);
    assert!(gapi.device().draws().is_empty());

    gapi.draw(PrimitiveType::Triangles, 0, 3).unwrap();
    gapi.draw(PrimitiveType::Triangles, 1, 3).unwrap();
    assert!(gapi.draw(PrimitiveType::Triangles, 2, 3).is_err());
    gapi.draw(PrimitiveType::TriangleStrips, 0, 8).unwrap();
    assert!(gapi.draw(PrimitiveType::TriangleFans, 0, 9).is_err());

    let draws = gapi.device().draws();
    assert_eq!(draws.len(), 3);
    assert_eq!(
        draws[1].kind,
        DrawKind::Arrays {
            first: 1,
            vertex_count: 9
        }
    );
    let effect = gapi.effects().get(EFFECT).unwrap();
    assert_eq!(draws[0].vertex_program, Some(effect.vertex_program()));
    assert_eq!(draws[0].fragment_program, Some(effect.fragment_program()));
}

#[test]
fn draw_binds_the_effect_and_streams() {
    let mut gapi = ready();
    assert_eq!(gapi.device().bound_program(ShaderStage::Vertex), None);
    assert!(gapi.device().vertex_attrib(0).is_none());

    gapi.draw(PrimitiveType::Points, 0, 10).unwrap();
    let effect = gapi.effects().get(EFFECT).unwrap();
    assert_eq!(
        gapi.device().bound_program(ShaderStage::Vertex),
        Some(effect.vertex_program())
    );
    let attrib = gapi.device().vertex_attrib(0).unwrap();
    assert_eq!(attrib.pointer.stride, 12);
    assert_eq!(gapi.device().array_buffer(), None);
}

#[test]
fn missing_effect_fails_at_draw() {
    let mut gapi = ready();
    gapi.set_effect(ResourceId(99)).unwrap();
    assert!(matches!(
        gapi.draw(PrimitiveType::Points, 0, 1),
        Err(Error::Validation(_))
    ));

    gapi.set_effect(EFFECT).unwrap();
    gapi.draw(PrimitiveType::Points, 0, 1).unwrap();
    gapi.destroy_effect(EFFECT).unwrap();
    assert!(gapi.draw(PrimitiveType::Points, 0, 1).is_err());
}

#[test]
fn destroyed_vertex_buffer_fails_at_draw() {
    let mut gapi = ready();
    gapi.draw(PrimitiveType::Points, 0, 1).unwrap();
    gapi.destroy_vertex_buffer(VERTICES).unwrap();
    assert!(matches!(
        gapi.draw(PrimitiveType::Points, 0, 1),
        Err(Error::Validation(_))
    ));

    gapi.create_vertex_buffer(VERTICES, 24, BufferFlags::empty()).unwrap();
    gapi.draw(PrimitiveType::Lines, 0, 1).unwrap();
    assert!(gapi.draw(PrimitiveType::Lines, 0, 2).is_err());
}

#[test]
fn missing_vertex_struct_fails_at_draw() {
    let mut gapi = ready();
    gapi.set_vertex_struct(ResourceId(42)).unwrap();
    assert!(gapi.draw(PrimitiveType::Points, 0, 1).is_err());
    gapi.set_vertex_struct(LAYOUT).unwrap();
    gapi.draw(PrimitiveType::Points, 0, 1).unwrap();
}

#[test]
fn vertex_input_changes_revalidate() {
    let mut gapi = ready();
    gapi.draw(PrimitiveType::Points, 0, 10).unwrap();
    gapi.set_vertex_input(LAYOUT, 0, position(VERTICES, 24)).unwrap();
    assert!(gapi.draw(PrimitiveType::Points, 0, 10).is_err());
    gapi.draw(PrimitiveType::Points, 0, 5).unwrap();

    assert!(gapi.set_vertex_input(LAYOUT, 1, position(VERTICES, 12)).is_err());
    assert!(gapi.create_vertex_struct(ResourceId(9), 0).is_err());
    assert!(gapi.create_vertex_struct(ResourceId(9), 17).is_err());
}

#[test]
fn indexed_draw_checks_ranges() {
    let mut gapi = ready();
    gapi.create_index_buffer(INDICES, 12, BufferFlags::empty()).unwrap();
    gapi.set_index_buffer_data(INDICES, 0, bytemuck::cast_slice(&[0u16, 1, 2, 2, 1, 9]))
        .unwrap();

    gapi.draw_indexed(PrimitiveType::Triangles, INDICES, 0, 2, 0, 9).unwrap();
    assert_eq!(gapi.index_buffers().get(INDICES).unwrap().index_type(), IndexType::U16);
    let DrawKind::Elements {
        index_type,
        min_index,
        max_index,
        index_count,
        offset,
        ..
    } = gapi.device().draws()[0].kind
    else {
        panic!("expected an indexed draw");
    };
    assert_eq!(
        (index_type, min_index, max_index, index_count, offset),
        (IndexType::U16, 0, 9, 6, 0)
    );

    // past the end of the index buffer
    assert!(gapi.draw_indexed(PrimitiveType::Triangles, INDICES, 1, 2, 0, 9).is_err());
    gapi.draw_indexed(PrimitiveType::Triangles, INDICES, 3, 1, 0, 9).unwrap();
    // past the end of the vertex streams
    assert!(gapi.draw_indexed(PrimitiveType::Triangles, INDICES, 0, 2, 0, 10).is_err());
    assert!(gapi.draw_indexed(PrimitiveType::Triangles, INDICES, 0, 2, 5, 4).is_err());
    assert!(matches!(
        gapi.draw_indexed(PrimitiveType::Triangles, ResourceId(77), 0, 1, 0, 2),
        Err(Error::UnknownResource {
            kind: ResourceKind::IndexBuffer,
            ..
        })
    ));
    assert_eq!(gapi.device().draws().len(), 2);
}

#[test]
fn zero_primitives_draw_nothing_but_succeed() {
    let mut gapi = ready();
    gapi.draw(PrimitiveType::TriangleStrips, 10, 0).unwrap();
    assert_eq!(
        gapi.device().draws()[0].kind,
        DrawKind::Arrays {
            first: 10,
            vertex_count: 0
        }
    );
}

#[test]
fn nothing_is_current_until_selected() {
    let mut gapi = Gapi::new(SoftDevice::new(64, 64), GapiConfig::default());
    gapi.initialize().unwrap();
    gapi.create_vertex_buffer(VERTICES, 120, BufferFlags::empty()).unwrap();
    assert!(
        gapi.create_effect(INVALID_RESOURCE, format!("vs_main\0ps_main\0{SOURCE}").as_bytes())
            .is_err()
    );
    assert!(gapi.create_vertex_struct(INVALID_RESOURCE, 1).is_err());
    assert!(gapi.set_vertex_input(INVALID_RESOURCE, 0, position(VERTICES, 12)).is_err());
    assert!(gapi.create_sampler(INVALID_RESOURCE).is_err());
    assert!(gapi.effects().is_empty());
    assert_eq!(gapi.device().live_programs(), 0);

    assert!(matches!(
        gapi.draw(PrimitiveType::Points, 0, 1),
        Err(Error::Validation(_))
    ));
    assert!(gapi.device().draws().is_empty());
}
