use std::io::{self, IoSliceMut, Read, Write};
use tracing::{debug, trace};

use crate::{Buffer, Result, SCRATCH_SIZE};

impl Buffer {
	/**
	Same as [`read_fd()`](#method.read_fd), but through `Read::read_vectored()`.

	`src` is asked once for up to `writable_bytes() + SCRATCH_SIZE` bytes,
	which only amounts to a single system call if `src` implements vectored reads natively
	(as `File`, `TcpStream`, `UnixStream` and `&[u8]` do).
	*/
	pub fn read_from<R: Read + ?Sized>(&mut self, src: &mut R) -> Result<usize> {
		let mut scratch = [0u8; SCRATCH_SIZE];
		let res = {
			let mut bufs = [
				IoSliceMut::new(self.begin_write()),
				IoSliceMut::new(&mut scratch),
			];
			src.read_vectored(&mut bufs)
		};
		let n = match res {
			Ok(n) => n,
			Err(err) => {
				debug!(%err, "vectored read failed");
				return Err(err.into());
			},
		};
		if n > self.writable_bytes() + SCRATCH_SIZE {
			debug!(n, "reader reported more bytes than it was given room for");
			return Err(io::Error::new(
				io::ErrorKind::InvalidData,
				format!("reader reported {} bytes read into {} bytes of room", n, self.writable_bytes() + SCRATCH_SIZE),
			).into());
		}
		trace!(n, writable = self.writable_bytes(), "vectored read");
		self.commit_read(n, &scratch);
		Ok(n)
	}

	/**
	Same as [`write_fd()`](#method.write_fd), but through `Write::write()`.

	Only bytes that `dst` reports as written are retired; short writes are not retried.
	*/
	pub fn write_to<W: Write + ?Sized>(&mut self, dst: &mut W) -> Result<usize> {
		let n = match dst.write(self.peek()) {
			Ok(n) => n,
			Err(err) => {
				debug!(%err, "write failed");
				return Err(err.into());
			},
		};
		trace!(n, readable = self.readable_bytes(), "write");
		self.retrieve(n);
		Ok(n)
	}
}

impl Write for Buffer {
	fn write(&mut self, data: &[u8]) -> io::Result<usize> {
		self.append(data);
		Ok(data.len())
	}
	fn flush(&mut self) -> io::Result<()> {
		Ok(())
	}
}

impl Read for Buffer {
	fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
		let n = std::cmp::min(out.len(), self.readable_bytes());
		out[ .. n ].copy_from_slice(&self.peek()[ .. n ]);
		self.retrieve(n);
		Ok(n)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Error;
	use std::collections::VecDeque;

	// hands out at most the given amount of bytes per call, then refuses
	struct ChokingWriter {
		limits: VecDeque<usize>,
		out: Vec<u8>,
	}
	impl Write for ChokingWriter {
		fn write(&mut self, data: &[u8]) -> io::Result<usize> {
			match self.limits.pop_front() {
				Some(limit) => {
					let n = std::cmp::min(limit, data.len());
					self.out.extend_from_slice(&data[..n]);
					Ok(n)
				},
				None => Err(io::Error::from_raw_os_error(libc::EAGAIN)),
			}
		}
		fn flush(&mut self) -> io::Result<()> {
			Ok(())
		}
	}

	struct FailingReader;
	impl Read for FailingReader {
		fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
			Err(io::Error::from_raw_os_error(libc::ECONNRESET))
		}
	}

	struct OverReportingReader;
	impl Read for OverReportingReader {
		fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
			Ok(200_000)
		}
	}

	// counts calls to make sure a read is never split in two
	struct CountingReader<'a> {
		data: &'a [u8],
		calls: usize,
	}
	impl Read for CountingReader<'_> {
		fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
			self.read_vectored(&mut [IoSliceMut::new(out)])
		}
		fn read_vectored(&mut self, bufs: &mut [IoSliceMut<'_>]) -> io::Result<usize> {
			self.calls += 1;
			self.data.read_vectored(bufs)
		}
	}

	fn payload(len: usize) -> Vec<u8> {
		(0..len).map(|i| (i % 251) as u8).collect()
	}

	#[test]
	fn read_fits() {
		let mut buf = Buffer::new(64);
		let n = buf.read_from(&mut &b"hello"[..]).unwrap();
		assert_eq!(n, 5);
		assert_eq!(buf.peek(), b"hello");
		assert_eq!(buf.capacity(), 64);
	}

	#[test]
	fn read_oversized() {
		let mut buf = Buffer::new(128);
		buf.append("head");
		buf.retrieve(2);
		let data = payload(buf.writable_bytes() + 40000);
		let mut src = CountingReader { data: &data, calls: 0 };

		let n = buf.read_from(&mut src).unwrap();
		assert_eq!(n, data.len());
		assert_eq!(src.calls, 1);
		assert_eq!(buf.readable_bytes(), 2 + data.len());
		assert_eq!(&buf.peek()[..2], b"ad");
		assert_eq!(&buf.peek()[2..], &data[..]);
	}

	#[test]
	fn read_caps_at_scratch() {
		let mut buf = Buffer::new(16);
		let data = payload(16 + SCRATCH_SIZE + 100);
		let mut src = &data[..];
		assert_eq!(buf.read_from(&mut src).unwrap(), 16 + SCRATCH_SIZE);
		assert_eq!(buf.read_from(&mut src).unwrap(), 100);
		assert_eq!(buf.peek(), &data[..]);
	}

	#[test]
	fn read_eof() {
		let mut buf = Buffer::new(16);
		assert_eq!(buf.read_from(&mut &b""[..]).unwrap(), 0);
		assert!(buf.is_empty());
	}

	#[test]
	fn read_error() {
		let mut buf = Buffer::new(16);
		buf.append("abc");
		match buf.read_from(&mut FailingReader) {
			Err(err @ Error::Io(_)) => assert_eq!(err.raw_os_error(), Some(libc::ECONNRESET)),
			other => panic!("unexpected {:?}", other),
		}
		assert_eq!(buf.peek(), b"abc");
		assert_eq!(buf.writable_bytes(), 13);
	}

	#[test]
	fn read_overreported() {
		let mut buf = Buffer::new(16);
		buf.append("abc");
		match buf.read_from(&mut OverReportingReader) {
			Err(Error::Io(err)) => assert_eq!(err.kind(), io::ErrorKind::InvalidData),
			other => panic!("unexpected {:?}", other),
		}
		assert_eq!(buf.peek(), b"abc");
		assert_eq!(buf.capacity(), 16);
	}

	#[test]
	fn short_write() {
		let data = payload(100);
		let mut buf = Buffer::new(128);
		buf.append(&data);
		let mut dst = ChokingWriter {
			limits: vec![5, 95].into(),
			out: vec![],
		};

		assert_eq!(buf.write_to(&mut dst).unwrap(), 5);
		assert_eq!(buf.readable_bytes(), 95);
		assert_eq!(buf.prependable_bytes(), 5);

		assert_eq!(buf.write_to(&mut dst).unwrap(), 95);
		assert_eq!(buf.readable_bytes(), 0);
		assert_eq!(dst.out, data);
	}

	#[test]
	fn write_error() {
		let mut buf = Buffer::new(16);
		buf.append("abc");
		let mut dst = ChokingWriter { limits: VecDeque::new(), out: vec![] };
		let err = buf.write_to(&mut dst).unwrap_err();
		assert_eq!(err.raw_os_error(), Some(libc::EAGAIN));
		assert_eq!(buf.peek(), b"abc");
		assert_eq!(buf.prependable_bytes(), 0);
	}

	#[test]
	fn io_traits() {
		let mut buf = Buffer::new(4);
		write!(buf, "{}-{}", 12, "ab").unwrap();
		assert_eq!(buf.peek(), b"12-ab");

		let mut out = [0u8; 3];
		assert_eq!(buf.read(&mut out).unwrap(), 3);
		assert_eq!(&out, b"12-");
		let mut rest = String::new();
		buf.read_to_string(&mut rest).unwrap();
		assert_eq!(rest, "ab");
		assert_eq!(buf.read(&mut out).unwrap(), 0);
	}
}
