use std::io;
use std::os::unix::io::{AsFd, AsRawFd};
use tracing::{debug, trace};

use crate::{Buffer, Result, SCRATCH_SIZE};

impl Buffer {
	/**
	Read whatever `fd` has to offer with a single `readv(2)`.

	The call spans the writable tail followed by a stack scratch area of [`SCRATCH_SIZE`] bytes;
	anything that lands in the latter is appended afterwards, growing the buffer as needed.
	Returns the amount of bytes read; zero means EOF.

	On failure the error carries `errno` verbatim (see [`Error::raw_os_error()`](crate::Error::raw_os_error))
	and the buffer is left as it was. `EINTR` and `EAGAIN` are reported as is, not retried.

	`fd` is only borrowed for the duration of the call.
	*/
	pub fn read_fd<F: AsFd>(&mut self, fd: F) -> Result<usize> {
		let fd = fd.as_fd().as_raw_fd();
		let mut scratch = [0u8; SCRATCH_SIZE];
		let tail = self.begin_write();
		let iov = [
			libc::iovec {
				iov_base: tail.as_mut_ptr().cast::<libc::c_void>(),
				iov_len: tail.len(),
			},
			libc::iovec {
				iov_base: scratch.as_mut_ptr().cast::<libc::c_void>(),
				iov_len: scratch.len(),
			},
		];
		let n = unsafe { libc::readv(fd, iov.as_ptr(), iov.len() as libc::c_int) };
		if n < 0 {
			let err = io::Error::last_os_error();
			debug!(fd, %err, "readv failed");
			return Err(err.into());
		}
		let n = n as usize;
		trace!(fd, n, writable = self.writable_bytes(), "readv");
		self.commit_read(n, &scratch);
		Ok(n)
	}

	/**
	Write readable bytes to `fd` with a single `write(2)`.

	Only as many bytes as the kernel accepted are retired,
	so the call has to be repeated until [`is_empty()`](#method.is_empty) to drain the buffer.
	On failure nothing is retired.
	*/
	pub fn write_fd<F: AsFd>(&mut self, fd: F) -> Result<usize> {
		let fd = fd.as_fd().as_raw_fd();
		let readable = self.peek();
		let n = unsafe { libc::write(fd, readable.as_ptr().cast::<libc::c_void>(), readable.len()) };
		if n < 0 {
			let err = io::Error::last_os_error();
			debug!(fd, %err, "write failed");
			return Err(err.into());
		}
		let n = n as usize;
		trace!(fd, n, readable = self.readable_bytes(), "write");
		self.retrieve(n);
		Ok(n)
	}
}
