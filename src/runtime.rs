//! In-process patch table
//!
//! Rust has no load-time symbol interposition, so overrides go through an
//! explicit indirection layer. Every hot call site is a [`HotFn`] cell
//! created by [`hot!`](crate::hot). A loaded patch registers
//! `(symbol key, replacement address)` pairs; the cell looks its key up in
//! the process-wide [`PatchTable`] and calls the replacement if one exists.
//!
//! Atomicity: a patch generation is installed under one write lock and the
//! table epoch is bumped before the lock is released. A caller racing with
//! an install sees either the previous implementation or the new one. Both
//! are whole function pointers; a torn pointer is impossible.
//!
//! ```ignore
//! pub fn greeting() -> String {
//!     (hot_reload::hot!(crate::greet::render as fn() -> String))()
//! }
//! ```

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{LazyLock, Mutex, OnceLock, PoisonError, RwLock};

/// Signature of the registration callback handed to a patch entry point
pub type RegisterFn = unsafe extern "C" fn(*mut c_void, *const u8, usize, *const ());

/// Signature of the entry point every patch library exports
pub type EntryFn = unsafe extern "C" fn(*mut c_void, RegisterFn);

static PATCH_TABLE: LazyLock<PatchTable> = LazyLock::new(PatchTable::new);

/// The process-wide patch table
pub fn patch_table() -> &'static PatchTable {
    &PATCH_TABLE
}

/// Symbol key to replacement address
#[derive(Debug, Default)]
pub struct PatchTable {
    entries: RwLock<HashMap<String, usize>>,
    epoch: AtomicU64,
}

impl PatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install one generation's overrides; returns how many were installed
    pub fn install<I>(&self, overrides: I) -> usize
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let mut installed = 0;
        for (key, address) in overrides {
            tracing::debug!(key = %key, "installing override");
            entries.insert(key, address);
            installed += 1;
        }
        self.epoch.fetch_add(1, Ordering::AcqRel);
        installed
    }

    pub fn lookup(&self, key: &str) -> Option<usize> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    /// Number of installs so far
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Installed keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }
}

/// Registration callback passed to patch entry points. `ctx` must point to
/// a `Vec<(String, usize)>`.
///
/// # Safety
///
/// `ctx` must be a valid, exclusive `*mut Vec<(String, usize)>` and
/// `key..key + len` a readable byte range.
pub unsafe extern "C" fn collect_override(ctx: *mut c_void, key: *const u8, len: usize, address: *const ()) {
    if ctx.is_null() || key.is_null() {
        return;
    }
    let (entries, bytes) = unsafe {
        (
            &mut *(ctx as *mut Vec<(String, usize)>),
            std::slice::from_raw_parts(key, len),
        )
    };
    entries.push((String::from_utf8_lossy(bytes).into_owned(), address as usize));
}

/// Call-site cell of one hot function
pub struct HotFn {
    module: &'static str,
    path: &'static str,
    key: OnceLock<String>,
    cache: Mutex<Option<(u64, usize)>>,
}

impl HotFn {
    /// `module` is the caller's `module_path!()`, `path` the stringified
    /// path of the function as written at the call site
    pub const fn new(module: &'static str, path: &'static str) -> Self {
        Self {
            module,
            path,
            key: OnceLock::new(),
            cache: Mutex::new(None),
        }
    }

    /// Patch table key of the target, `{crate}::{module}::{name}`
    pub fn key(&self) -> &str {
        self.key.get_or_init(|| resolve_key(self.module, self.path))
    }

    /// The current implementation: the latest installed override, or
    /// `original` when there is none.
    ///
    /// `F` must be the function pointer type of the target; the `hot!`
    /// macro enforces this by casting the original to it.
    pub fn get<F: Copy>(&self, original: F) -> F {
        let table = patch_table();
        let epoch = table.epoch();
        if epoch == 0 || std::mem::size_of::<F>() != std::mem::size_of::<usize>() {
            return original;
        }

        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let address = match *cache {
            Some((seen, address)) if seen == epoch => address,
            _ => {
                let address = table.lookup(self.key()).unwrap_or(0);
                *cache = Some((epoch, address));
                address
            }
        };
        if address == 0 {
            return original;
        }
        // SAFETY: the address was registered for this key by a patch
        // compiled from a function with the same signature, and `F` is a
        // function pointer of that signature.
        unsafe { std::mem::transmute_copy::<usize, F>(&address) }
    }
}

/// Resolve a call-site path against the caller's module into a table key
pub fn resolve_key(module: &str, path: &str) -> String {
    let path: String = path.chars().filter(|c| !c.is_whitespace()).collect();
    if let Some(absolute) = path.strip_prefix("::") {
        return absolute.to_string();
    }

    let mut base: Vec<&str> = module.split("::").collect();
    let mut segments = path.split("::").peekable();
    match segments.peek().copied() {
        Some("crate") => {
            base.truncate(1);
            segments.next();
        }
        Some("self") => {
            segments.next();
        }
        Some("super") => {
            while segments.peek() == Some(&"super") {
                if base.len() > 1 {
                    base.pop();
                }
                segments.next();
            }
        }
        _ => {}
    }
    base.extend(segments);
    base.join("::")
}

/// Route a call through the patch table.
///
/// Expands to a function pointer of type `$ty`: the latest installed
/// override of `$path`, or `$path` itself.
///
/// ```ignore
/// let render = hot_reload::hot!(crate::greet::render as fn(&str) -> String);
/// println!("{}", render("world"));
/// ```
#[macro_export]
macro_rules! hot {
    ($path:path as $ty:ty) => {{
        static CELL: $crate::runtime::HotFn = $crate::runtime::HotFn::new(module_path!(), stringify!($path));
        CELL.get::<$ty>($path as $ty)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn greeting() -> &'static str {
        "A"
    }

    fn greeting_patched() -> &'static str {
        "B"
    }

    fn untouched() -> u32 {
        1
    }

    #[test]
    fn resolve_crate_relative_path() {
        assert_eq!(resolve_key("app::ui", "crate::greet::render"), "app::greet::render");
        assert_eq!(resolve_key("app::ui", "crate :: greet :: render"), "app::greet::render");
    }

    #[test]
    fn resolve_self_super_and_relative_paths() {
        assert_eq!(resolve_key("app::ui::menu", "self::draw"), "app::ui::menu::draw");
        assert_eq!(resolve_key("app::ui::menu", "super::draw"), "app::ui::draw");
        assert_eq!(resolve_key("app::ui::menu", "super::super::draw"), "app::draw");
        assert_eq!(resolve_key("app", "greet::render"), "app::greet::render");
        assert_eq!(resolve_key("app::ui", "::other::f"), "other::f");
    }

    #[test]
    fn cell_key_uses_module_path() {
        let cell = HotFn::new("app::ui", "crate::Counter::tick");
        assert_eq!(cell.key(), "app::Counter::tick");
    }

    #[test]
    fn install_bumps_epoch_once_per_generation() {
        let table = PatchTable::new();
        let installed = table.install(vec![("a::x".to_string(), 1), ("a::y".to_string(), 2)]);
        assert_eq!(installed, 2);
        assert_eq!(table.epoch(), 1);
        assert_eq!(table.lookup("a::y"), Some(2));
        assert_eq!(table.keys(), vec!["a::x", "a::y"]);
    }

    #[test]
    fn live_call_observes_override() {
        let call = || crate::hot!(self::greeting as fn() -> &'static str)();
        assert_eq!(call(), "A");

        let key = format!("{}::greeting", module_path!());
        patch_table().install([(key, greeting_patched as fn() -> &'static str as usize)]);

        assert_eq!(call(), "B");
    }

    #[test]
    fn calls_without_override_use_original() {
        patch_table().install(std::iter::empty());
        let value = crate::hot!(self::untouched as fn() -> u32)();
        assert_eq!(value, 1);
    }

    #[test]
    fn collect_override_reads_key_and_address() {
        let mut entries: Vec<(String, usize)> = Vec::new();
        let key = "app::foo";
        unsafe {
            collect_override(
                &mut entries as *mut Vec<(String, usize)> as *mut c_void,
                key.as_ptr(),
                key.len(),
                0x10 as *const (),
            );
        }
        assert_eq!(entries, vec![("app::foo".to_string(), 0x10)]);
    }
}
