//! Releasing a `ParsedUri` gives back every byte it owned.

use fcgi_uri::{parse_uri, release_parsed_uri};

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

/// Tracks the bytes live on the current thread
struct Counting;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
}

fn adjust(delta: isize) {
    // Ignored while the thread is being torn down
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            adjust(layout.size() as isize);
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        adjust(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize)
                      -> *mut u8
    {
        let new = System.realloc(ptr, layout, new_size);
        if !new.is_null() {
            adjust(new_size as isize - layout.size() as isize);
        }
        new
    }
}

#[global_allocator]
static ALLOCATOR: Counting = Counting;

fn live() -> isize {
    LIVE.with(Cell::get)
}

#[test]
fn release_frees_every_component() {
    // Warm up any lazily initialized state in the parser
    release_parsed_uri(parse_uri("http://warm.example/up?a=b#c").unwrap());

    let before = live();

    let uri = parse_uri("http://user:pw@example.com:8080/a/b?x=1&y&z=%20#frag")
        .unwrap();
    assert!(live() > before);
    assert_eq!(uri.query.len(), 3);

    release_parsed_uri(uri);
    assert_eq!(live(), before);
}

#[test]
fn failed_parse_keeps_nothing() {
    let before = live();

    assert!(parse_uri("http://[invalid").is_err());
    assert!(parse_uri("/with space").is_err());

    assert_eq!(live(), before);
}
