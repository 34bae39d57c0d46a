//! Heap accounting.
//!
//! Rust has no runtime that tracks heap usage, so the live and cumulative
//! figures in the debug report come from an allocator wrapper. Install it in
//! the binary to get real numbers:
//!
//! ```rust,ignore
//! #[global_allocator]
//! static GLOBAL: routedump::alloc::TrackingAllocator = routedump::alloc::TrackingAllocator;
//! ```
//!
//! Without it both figures read zero.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicU64, Ordering};

static ALLOCATED: AtomicU64 = AtomicU64::new(0);
static TOTAL_ALLOCATED: AtomicU64 = AtomicU64::new(0);

/// Delegates to the system allocator and counts bytes on the way through.
pub struct TrackingAllocator;

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            grew(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            grew(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        shrank(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new = unsafe { System.realloc(ptr, layout, new_size) };
        if !new.is_null() {
            shrank(layout.size());
            grew(new_size);
        }
        new
    }
}

fn grew(size: usize) {
    ALLOCATED.fetch_add(size as u64, Ordering::Relaxed);
    TOTAL_ALLOCATED.fetch_add(size as u64, Ordering::Relaxed);
}

fn shrank(size: usize) {
    ALLOCATED.fetch_sub(size as u64, Ordering::Relaxed);
}

/// Heap bytes currently allocated through [`TrackingAllocator`].
pub fn allocated() -> u64 {
    ALLOCATED.load(Ordering::Relaxed)
}

/// Heap bytes ever allocated through [`TrackingAllocator`].
pub fn total_allocated() -> u64 {
    TOTAL_ALLOCATED.load(Ordering::Relaxed)
}
