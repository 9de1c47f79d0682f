mod dummy;

use cubefold_common::word::WORD_SIZE;
use cubefold_runtime::server::{CubeCount, CubeDim, IoError, LaunchError, ResourceLimitError};
use dummy::*;
use pretty_assertions::assert_eq;

#[test_log::test]
fn allocated_memory_is_zeroed() {
    let client = init_client();
    let handle = client.allocate(WORD_SIZE, 3, "zeroed").unwrap();

    assert_eq!(client.read_one(&handle).unwrap(), vec![0, 0, 0]);

    client.dealloc(handle).unwrap();
}

#[test_log::test]
fn written_value_is_read_back() {
    let client = init_client();
    let handle = client.allocate(8, 1, "value").unwrap();

    client.binding(&handle).unwrap().store(0, &-12345i64);

    assert_eq!(client.read_value::<i64>(&handle).unwrap(), -12345);

    client.dealloc(handle).unwrap();
}

#[test_log::test]
fn execute_elementwise_addition() {
    let client = init_client();
    let lhs = client.allocate(WORD_SIZE, 3, "lhs").unwrap();
    let rhs = client.allocate(WORD_SIZE, 3, "rhs").unwrap();
    let out = client.allocate(WORD_SIZE, 3, "out").unwrap();

    for (i, (l, r)) in [(0, 4), (1, 4), (2, 4)].into_iter().enumerate() {
        client.binding(&lhs).unwrap().store_word(i, l);
        client.binding(&rhs).unwrap().store_word(i, r);
    }

    let kernel = DummyElementwiseAddition {
        lhs: client.binding(&lhs).unwrap(),
        rhs: client.binding(&rhs).unwrap(),
        out: client.binding(&out).unwrap(),
    };
    client
        .launch(&kernel, CubeCount::new_1d(3), CubeDim::new_single(), 0)
        .unwrap();

    assert_eq!(client.read_one(&out).unwrap(), vec![4, 5, 6]);
}

#[test_log::test]
fn shared_memory_is_private_to_a_cube() {
    let client = init_client();
    let out = client.allocate(WORD_SIZE, 4, "out").unwrap();
    let kernel = DummySharedCopy {
        out: client.binding(&out).unwrap(),
    };

    client
        .launch(&kernel, CubeCount::new_1d(4), CubeDim::new_single(), 1)
        .unwrap();

    assert_eq!(client.read_one(&out).unwrap(), vec![0, 10, 20, 30]);
}

#[test_log::test]
fn launch_over_device_limits_is_rejected() {
    let client = init_client();
    let out = client.allocate(WORD_SIZE, 2, "out").unwrap();
    let kernel = DummySharedCopy {
        out: client.binding(&out).unwrap(),
    };

    let err = client
        .launch(&kernel, CubeCount::new_1d(1), CubeDim::new_1d(2), 1)
        .unwrap_err();

    assert!(matches!(
        err,
        LaunchError::TooManyResources(ResourceLimitError::Units { .. })
    ));
    assert_eq!(client.read_one(&out).unwrap(), vec![0, 0]);
}

#[test_log::test]
fn memory_usage_follows_allocations() {
    let client = init_client();
    let first = client.allocate(10, 1, "first").unwrap();
    let second = client.allocate(WORD_SIZE, 4, "second").unwrap();

    let usage = client.memory_usage();
    assert_eq!(usage.number_allocs, 2);
    assert_eq!(usage.bytes_in_use, 28);

    client.dealloc(first).unwrap();
    client.dealloc(second).unwrap();

    let usage = client.memory_usage();
    assert_eq!(usage.number_allocs, 0);
    assert_eq!(usage.bytes_in_use, 0);
    assert_eq!(usage.bytes_peak, 28);
}

#[test_log::test]
fn allocation_over_max_memory_fails() {
    let client = init_client();

    let err = client
        .allocate(WORD_SIZE, MAX_MEMORY as usize, "too big")
        .unwrap_err();

    assert!(matches!(err, IoError::BufferTooBig { .. }));
    assert_eq!(client.memory_usage().number_allocs, 0);
}

#[test_log::test]
fn clients_are_cached_per_device() {
    let client = test_client(&DummyDevice);
    let handle = client.allocate(WORD_SIZE, 1, "cached").unwrap();

    client.binding(&handle).unwrap().store_word(0, 7);

    let same = test_client(&DummyDevice);
    assert_eq!(same.read_one(&handle).unwrap(), vec![7]);

    same.dealloc(handle).unwrap();
}
