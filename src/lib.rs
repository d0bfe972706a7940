/*!
Growable byte buffer for staging data between a file descriptor and whatever parses it.

[`Buffer`] keeps one contiguous store and two cursors over it:

```text
|  prependable  |   readable   |   writable   |
0           read_pos       write_pos       capacity
```

Data is appended at the write cursor and consumed from the read cursor.
When the tail runs out, consumed space at the front is reclaimed by moving readable bytes down,
and only if that is not enough the store grows.

Reads from a descriptor are done with a single `readv(2)`
that spans both the writable tail and a 64 KiB scratch area on the stack,
so one call never loses data even if it brings more than the buffer can currently hold.

## Example usage

```no_run
use fd_buf::Buffer;
use std::os::unix::net::UnixStream;

# fn foo(sock: &UnixStream) -> fd_buf::Result<()> {
let mut buf = Buffer::new(1024);

// one readv(2) no matter how much is pending on the socket
let n = buf.read_fd(sock)?;
if n == 0 {
	// peer closed its end
	return Ok(());
}

if let Some(eol) = buf.find(b"\r\n") {
	let line = buf.peek()[..eol].to_vec();
	// retire the line along with its terminator
	buf.retrieve_until(eol + 2);
	buf.append(&line);
}

// partial writes only retire what was actually written
while !buf.is_empty() {
	buf.write_fd(sock)?;
}
# Ok(())
# }
```

Contract violations (retrieving more than is readable, committing more than is writable)
panic; failed transfers are reported as [`Error`] and leave both cursors untouched.
*/

#[macro_use]
extern crate quick_error;

use std::io;
use std::string::FromUtf8Error;

mod buffer;
pub use buffer::*;

mod io_impl;

#[cfg(unix)]
mod fd;

/// Size of the stack scratch area that catches whatever doesn't fit into the writable tail during a single read
pub const SCRATCH_SIZE: usize = 65535;

/// Capacity of [`Buffer::default()`](struct.Buffer.html#impl-Default)
pub const DEFAULT_CAPACITY: usize = 1024;

quick_error! {
	/// Recoverable failure of a descriptor (or reader/writer) transfer
	#[derive(Debug)]
	pub enum Error {
		Io(err: io::Error) {
			from()
			display("transfer failed: {}", err)
			cause(err)
		}
		Utf8(err: FromUtf8Error) {
			from()
			display("readable bytes are not valid UTF-8: {}", err)
			cause(err)
		}
	}
}

impl Error {
	/// Platform error code (`errno`) of a failed transfer, exactly as reported by the OS
	pub fn raw_os_error(&self) -> Option<i32> {
		match self {
			Error::Io(err) => err.raw_os_error(),
			Error::Utf8(_) => None,
		}
	}
}

pub type Result<T> = std::result::Result<T, Error>;

/// What [`Buffer::retrieve_all()`](struct.Buffer.html#method.retrieve_all) does to the store besides rewinding cursors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetPolicy {
	/// Zero-fill the whole store so stale payload can't be observed through raw storage
	Zero,
	/// Only rewind cursors; old bytes stay in place until overwritten
	Cursors,
}

impl Default for ResetPolicy {
	fn default() -> Self {
		ResetPolicy::Zero
	}
}

pub struct BufferBuilder {
	capacity: usize,
	reset: ResetPolicy,
}
impl BufferBuilder {
	pub fn new() -> Self {
		BufferBuilder {
			capacity: DEFAULT_CAPACITY,
			reset: ResetPolicy::default(),
		}
	}

	/// Initial size of the store. It is allocated (and zeroed) right away.
	pub fn capacity(mut self, capacity: usize) -> Self {
		self.capacity = capacity;
		self
	}

	pub fn reset_policy(mut self, reset: ResetPolicy) -> Self {
		self.reset = reset;
		self
	}

	pub fn build(self) -> Buffer {
		Buffer::with_policy(self.capacity, self.reset)
	}
}

impl Default for BufferBuilder {
	fn default() -> Self {
		Self::new()
	}
}
