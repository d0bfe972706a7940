// https://github.com/rust-lang/rust/issues/54236
use copy_in_place::*;
use memchr::{memchr, memmem};
use tracing::{debug, trace};

use crate::{Result, ResetPolicy, DEFAULT_CAPACITY};

#[derive(Clone)]
pub struct Buffer {
	buf: Vec<u8>,
	/*
	|  xxxyyy    |
	   |    |write_pos
	   |read_pos

	[0, read_pos) is consumed and can be reclaimed,
	[read_pos, write_pos) is readable,
	[write_pos, buf.len()) is writable without reallocation
	*/
	read_pos: usize,
	write_pos: usize,
	reset: ResetPolicy,
}

impl Buffer {
	/// Allocate zeroed store of `cap` bytes
	pub fn new(cap: usize) -> Self {
		Self::with_policy(cap, ResetPolicy::default())
	}

	pub(crate) fn with_policy(cap: usize, reset: ResetPolicy) -> Self {
		Buffer {
			buf: vec![0; cap],
			read_pos: 0, write_pos: 0,
			reset,
		}
	}

	pub fn readable_bytes(&self) -> usize {
		self.write_pos - self.read_pos
	}
	pub fn writable_bytes(&self) -> usize {
		self.buf.len() - self.write_pos
	}
	/// Space already consumed at the front of the store, reclaimable by compaction
	pub fn prependable_bytes(&self) -> usize {
		self.read_pos
	}
	/// Overall size of the store
	pub fn capacity(&self) -> usize {
		self.buf.len()
	}
	pub fn is_empty(&self) -> bool {
		self.read_pos == self.write_pos
	}
	pub fn reset_policy(&self) -> ResetPolicy {
		self.reset
	}

	/// Readable part of the buffer. Empty if there's nothing to read.
	pub fn peek(&self) -> &[u8] {
		&self.buf[ self.read_pos .. self.write_pos ]
	}

	/**
	Mark `len` bytes at the start of [`peek()`](#method.peek) as consumed.

	# Panics

	If `len` exceeds [`readable_bytes()`](#method.readable_bytes).
	*/
	pub fn retrieve(&mut self, len: usize) {
		assert!(
			len <= self.readable_bytes(),
			"retrieving {} bytes with only {} readable", len, self.readable_bytes(),
		);
		self.read_pos += len;
	}

	/**
	Consume everything before `end`, which is an offset into [`peek()`](#method.peek)
	(e.g. as returned by [`find()`](#method.find)).

	# Panics

	If `end` lies past the readable part of the buffer.
	*/
	pub fn retrieve_until(&mut self, end: usize) {
		assert!(
			end <= self.readable_bytes(),
			"end marker {} lies outside of {} readable bytes", end, self.readable_bytes(),
		);
		self.retrieve(end);
	}

	/// Rewind both cursors to the start of the store, wiping it first unless [`ResetPolicy::Cursors`] is in effect
	pub fn retrieve_all(&mut self) {
		if self.reset == ResetPolicy::Zero {
			self.buf.fill(0);
		}
		self.read_pos = 0;
		self.write_pos = 0;
	}

	/// Copy out all readable bytes, then [`retrieve_all()`](#method.retrieve_all)
	pub fn retrieve_all_to_vec(&mut self) -> Vec<u8> {
		let out = self.peek().to_vec();
		self.retrieve_all();
		out
	}

	/**
	Like [`retrieve_all_to_vec()`](#method.retrieve_all_to_vec), but for text.

	Buffer is emptied even if its contents turn out not to be UTF-8;
	the bytes can then be recovered from the error.
	*/
	pub fn retrieve_all_to_str(&mut self) -> Result<String> {
		Ok(String::from_utf8(self.retrieve_all_to_vec())?)
	}

	/**
	Writable tail of the buffer, for filling it in place.

	Use [`has_written()`](#method.has_written) to make written bytes readable,
	and [`ensure_writable()`](#method.ensure_writable) beforehand if the tail is too short.
	*/
	pub fn begin_write(&mut self) -> &mut [u8] {
		&mut self.buf[ self.write_pos .. ]
	}
	pub fn begin_write_const(&self) -> &[u8] {
		&self.buf[ self.write_pos .. ]
	}

	/**
	Attach `len` bytes of [`begin_write()`](#method.begin_write) to the readable part.

	# Panics

	If `len` exceeds [`writable_bytes()`](#method.writable_bytes).
	*/
	pub fn has_written(&mut self, len: usize) {
		assert!(
			len <= self.writable_bytes(),
			"committing {} bytes with only {} writable", len, self.writable_bytes(),
		);
		self.write_pos += len;
	}

	/// Copy `data` after readable bytes, making room for it first if needed
	pub fn append<D: AsRef<[u8]>>(&mut self, data: D) {
		let data = data.as_ref();
		self.ensure_writable(data.len());
		self.begin_write()[ .. data.len() ].copy_from_slice(data);
		self.has_written(data.len());
	}

	/// Append readable bytes of another buffer. `other` is left as is.
	pub fn append_buffer(&mut self, other: &Buffer) {
		self.append(other.peek());
	}

	/// Make sure at least `len` bytes can be written without further reallocations
	pub fn ensure_writable(&mut self, len: usize) {
		if self.writable_bytes() < len {
			self.make_space(len);
		}
		debug_assert!(self.writable_bytes() >= len);
	}

	// make room for new data one way or the other
	fn make_space(&mut self, len: usize) {
		if self.writable_bytes() + self.prependable_bytes() < len {
			// even reclaiming consumed space won't do; grow just enough (and one byte more)
			let old = self.buf.len();
			let size = match self.write_pos.checked_add(len).and_then(|n| n.checked_add(1)) {
				Some(size) => size,
				None => panic!("capacity overflow: {} bytes requested past {}", len, self.write_pos),
			};
			self.buf.resize(size, 0);
			debug!(from = old, to = self.buf.len(), "grew buffer");
		} else {
			/*
			before:
			|--xxxyyy  |
			   |    |write_pos
			   |read_pos

			after:
			|xxxyyy    |
			 |    |write_pos
			 |read_pos
			*/
			let readable = self.readable_bytes();
			if readable != 0 {
				//self.buf.copy_within(self.read_pos..self.write_pos, 0)
				copy_in_place(&mut self.buf, self.read_pos..self.write_pos, 0);
			}
			trace!(reclaimed = self.read_pos, readable, "compacted buffer");
			self.read_pos = 0;
			self.write_pos = readable;
		}
	}

	/*
	Bookkeeping after a scatter read of `n` bytes
	into the writable tail followed by `scratch`.
	Tail is filled first, so anything past its length has landed in `scratch`.
	*/
	pub(crate) fn commit_read(&mut self, n: usize, scratch: &[u8]) {
		let writable = self.writable_bytes();
		if n <= writable {
			self.write_pos += n;
		} else {
			self.write_pos = self.buf.len();
			self.append(&scratch[ .. n - writable ]);
		}
	}

	/// Offset of the first occurrence of `needle` within [`peek()`](#method.peek)
	pub fn find(&self, needle: &[u8]) -> Option<usize> {
		memmem::find(self.peek(), needle)
	}

	/// Offset of the first `byte` within [`peek()`](#method.peek)
	pub fn find_byte(&self, byte: u8) -> Option<usize> {
		memchr(byte, self.peek())
	}
}

impl Default for Buffer {
	fn default() -> Self {
		Buffer::new(DEFAULT_CAPACITY)
	}
}

impl std::fmt::Debug for Buffer {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Buffer")
			.field("prependable", &self.prependable_bytes())
			.field("readable", &self.readable_bytes())
			.field("writable", &self.writable_bytes())
			.field("reset", &self.reset)
			.finish()
	}
}
