// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use command_buffer_gapi::device::NativeBuffer;
use command_buffer_gapi::error::Error;
use command_buffer_gapi::geometry::BufferFlags;
use command_buffer_gapi::resource::ResourceKind;
use command_buffer_gapi::{Gapi, GapiConfig, INVALID_RESOURCE, ParseError, ResourceId, SoftDevice};

fn engine() -> Gapi<SoftDevice> {
    let mut gapi = Gapi::new(SoftDevice::new(64, 64), GapiConfig::default());
    gapi.initialize().unwrap();
    gapi
}

#[test]
fn vertex_buffer_round_trip() {
    let mut gapi = engine();
    let id = ResourceId(1);
    gapi.create_vertex_buffer(id, 16, BufferFlags::DYNAMIC).unwrap();
    assert!(gapi.vertex_buffers().get(id).unwrap().flags().contains(BufferFlags::DYNAMIC));

    gapi.set_vertex_buffer_data(id, 4, &[1, 2, 3, 4]).unwrap();
    let mut out = [0xFFu8; 8];
    gapi.get_vertex_buffer_data(id, 0, &mut out).unwrap();
    assert_eq!(out, [0, 0, 0, 0, 1, 2, 3, 4]);
}

#[test]
fn out_of_range_transfer_changes_nothing() {
    let mut gapi = engine();
    let id = ResourceId(1);
    gapi.create_vertex_buffer(id, 8, BufferFlags::empty()).unwrap();
    gapi.set_vertex_buffer_data(id, 0, &[7; 8]).unwrap();

    let result = gapi.set_vertex_buffer_data(id, 4, &[9; 5]);
    assert!(matches!(result, Err(Error::OutOfRange)));
    assert_eq!(ParseError::from_result(&result), ParseError::InvalidArguments);

    let mut out = [0u8; 8];
    gapi.get_vertex_buffer_data(id, 0, &mut out).unwrap();
    assert_eq!(out, [7; 8]);
    let mut too_long = [0u8; 9];
    assert!(gapi.get_vertex_buffer_data(id, 0, &mut too_long).is_err());
}

#[test]
fn create_destroy_round_trip() {
    let mut gapi = engine();
    let id = ResourceId(5);
    gapi.create_index_buffer(id, 12, BufferFlags::empty()).unwrap();
    assert_eq!(gapi.device().live_buffers(), 1);

    gapi.destroy_index_buffer(id).unwrap();
    assert!(!gapi.index_buffers().contains(id));
    assert_eq!(gapi.device().live_buffers(), 0);

    let again = gapi.destroy_index_buffer(id);
    assert!(matches!(
        again,
        Err(Error::UnknownResource {
            kind: ResourceKind::IndexBuffer,
            ..
        })
    ));
    assert_eq!(ParseError::from_result(&again), ParseError::InvalidArguments);
}

#[test]
fn recreating_an_id_releases_the_old_buffer() {
    let mut gapi = engine();
    let id = ResourceId(2);
    gapi.create_vertex_buffer(id, 8, BufferFlags::empty()).unwrap();
    gapi.set_vertex_buffer_data(id, 0, &[1; 8]).unwrap();
    gapi.create_vertex_buffer(id, 4, BufferFlags::empty()).unwrap();

    assert_eq!(gapi.device().live_buffers(), 1);
    assert_eq!(gapi.vertex_buffers().get(id).unwrap().size(), 4);
    let mut out = [0xFFu8; 4];
    gapi.get_vertex_buffer_data(id, 0, &mut out).unwrap();
    assert_eq!(out, [0; 4]);
}

#[test]
fn index_buffer_width() {
    let mut gapi = engine();
    gapi.create_index_buffer(ResourceId(1), 8, BufferFlags::INDEX_32BIT).unwrap();
    gapi.set_index_buffer_data(ResourceId(1), 0, bytemuck::cast_slice(&[3u32, 4])).unwrap();
    let mut out = [0u32; 2];
    gapi.get_index_buffer_data(ResourceId(1), 0, bytemuck::cast_slice_mut(&mut out))
        .unwrap();
    assert_eq!(out, [3, 4]);
}

#[test]
fn allocation_failure_registers_nothing() {
    let mut gapi = Gapi::new(
        SoftDevice::new(64, 64).with_max_allocation(64),
        GapiConfig::default(),
    );
    gapi.initialize().unwrap();
    let result = gapi.create_vertex_buffer(ResourceId(1), 65, BufferFlags::empty());
    assert!(matches!(result, Err(Error::Device(_))));
    assert!(gapi.vertex_buffers().is_empty());
}

#[test]
fn commands_need_an_initialized_engine() {
    let mut gapi = Gapi::new(SoftDevice::new(64, 64), GapiConfig::default());
    assert!(gapi.create_vertex_buffer(ResourceId(1), 4, BufferFlags::empty()).is_err());
    gapi.initialize().unwrap();
    gapi.create_vertex_buffer(ResourceId(1), 4, BufferFlags::empty()).unwrap();

    gapi.destroy();
    assert!(!gapi.is_initialized());
    assert_eq!(gapi.device().live_buffers(), 0);
    assert_eq!(gapi.device().array_buffer(), None::<NativeBuffer>);
}

#[test]
fn lost_context_is_fatal() {
    let mut gapi = engine();
    gapi.create_vertex_buffer(ResourceId(1), 4, BufferFlags::empty()).unwrap();
    gapi.device_mut().lose_context();
    let result = gapi.set_vertex_buffer_data(ResourceId(1), 0, &[1]);
    assert!(matches!(result, Err(Error::ContextLost)));
    assert_eq!(ParseError::from_result(&result), ParseError::ContextLost);
}

#[test]
fn reserved_id_is_never_registered() {
    let mut gapi = engine();
    let result = gapi.create_vertex_buffer(INVALID_RESOURCE, 4, BufferFlags::empty());
    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert_eq!(ParseError::from_result(&result), ParseError::InvalidArguments);
    assert!(gapi.create_index_buffer(INVALID_RESOURCE, 4, BufferFlags::empty()).is_err());
    assert!(gapi.vertex_buffers().is_empty());
    assert!(gapi.index_buffers().is_empty());
    assert_eq!(gapi.device().live_buffers(), 0);
}
