//! Allocation bounds for hostile element counts
//!
//! Runs in its own test binary: the global allocator below records the largest
//! single allocation made while decoding.

use ledgerwire::wire::encode_varint;
use ledgerwire::{Block, Decode, ErrorKind, Tx};
use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

struct PeakAllocator;

static TRACKING: AtomicBool = AtomicBool::new(false);
static LARGEST: AtomicUsize = AtomicUsize::new(0);

unsafe impl GlobalAlloc for PeakAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if TRACKING.load(Ordering::Relaxed) {
            LARGEST.fetch_max(layout.size(), Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if TRACKING.load(Ordering::Relaxed) {
            LARGEST.fetch_max(new_size, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

#[global_allocator]
static ALLOCATOR: PeakAllocator = PeakAllocator;

/// Decodes `data` and returns the error kind plus the largest allocation seen.
fn decode_tracked<T: Decode>(data: &[u8]) -> (Option<ErrorKind>, usize) {
    LARGEST.store(0, Ordering::SeqCst);
    TRACKING.store(true, Ordering::SeqCst);
    let kind = T::decode(data).err().map(|e| e.kind());
    TRACKING.store(false, Ordering::SeqCst);
    (kind, LARGEST.load(Ordering::SeqCst))
}

// Single test so no other thread allocates while tracking is on.
#[test]
fn test_declared_counts_do_not_size_allocations() {
    const CLAIMED: usize = 1_000_000;

    // Transaction claiming a million inputs over filler that cannot parse.
    let mut tx = vec![0x01, 0x00, 0x00];
    tx.extend(encode_varint(CLAIMED as u64));
    tx.extend(std::iter::repeat(0xff).take(CLAIMED));

    let (kind, largest) = decode_tracked::<Tx>(&tx);
    assert_eq!(kind, Some(ErrorKind::Malformed));
    assert!(largest < tx.len(), "largest allocation {} bytes", largest);

    // Block with a valid empty header claiming a million transactions.
    let mut block = vec![0x01, 0x00];
    block.extend([0u8; 32]);
    block.push(0x00);
    block.push(64);
    block.extend([0u8; 64]);
    block.extend([0x00, 0x00]);
    block.extend(encode_varint(CLAIMED as u64));
    block.extend(std::iter::repeat(0xff).take(CLAIMED));

    let (kind, largest) = decode_tracked::<Block>(&block);
    assert_eq!(kind, Some(ErrorKind::Malformed));
    assert!(largest < block.len(), "largest allocation {} bytes", largest);
}
