use crate::capture::domain::capture_error::CaptureError;
use crate::capture::domain::capture_source::CaptureSource;
use crate::shared::constants::{
    CAPTURE_FPS, CAPTURE_HEIGHT, CAPTURE_WIDTH, MAX_CONSECUTIVE_READ_FAILURES,
};
use crate::shared::frame::Frame;

/// Packets read per `read_frame` call before giving up on this tick.
const MAX_PACKETS_PER_FRAME: usize = 16;

/// Live camera capture through ffmpeg-next's device inputs
/// (libavdevice: v4l2, avfoundation or vfwcap depending on the platform).
///
/// Frame size and rate are requested at open time; the device may ignore
/// them. Each decoded frame is converted to RGB24.
///
/// End of stream, or too many failed reads in a row, means the device is
/// gone: the handle is released and the error is reported as
/// [`CaptureError::Unavailable`].
pub struct FfmpegCamera {
    device: String,
    input_format: String,
    width: u32,
    height: u32,
    fps: u32,
    session: Option<CameraSession>,
    consecutive_failures: u32,
    frame_index: usize,
}

// Safety: FfmpegCamera is owned by one thread at a time (the monitor moves
// it into its worker and gets it back on join). The raw pointers inside
// ffmpeg types are never shared.
unsafe impl Send for FfmpegCamera {}

impl FfmpegCamera {
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            input_format: default_input_format().to_string(),
            width: CAPTURE_WIDTH,
            height: CAPTURE_HEIGHT,
            fps: CAPTURE_FPS,
            session: None,
            consecutive_failures: 0,
            frame_index: 0,
        }
    }

    /// Overrides the libavdevice input format (e.g. `"v4l2"`).
    pub fn with_input_format(mut self, input_format: impl Into<String>) -> Self {
        self.input_format = input_format.into();
        self
    }

    pub fn device(&self) -> &str {
        &self.device
    }
}

impl CaptureSource for FfmpegCamera {
    fn open(&mut self) -> Result<(), CaptureError> {
        if self.session.is_some() {
            return Ok(());
        }

        let session = CameraSession::open(
            &self.device,
            &self.input_format,
            self.width,
            self.height,
            self.fps,
        )
        .map_err(|e| CaptureError::Unavailable(format!("{}: {e}", self.device)))?;

        log::info!(
            "Camera {} opened ({}x{}, {})",
            self.device,
            session.width,
            session.height,
            self.input_format
        );
        self.session = Some(session);
        self.consecutive_failures = 0;
        self.frame_index = 0;
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.session.is_some()
    }

    fn read_frame(&mut self) -> Result<Frame, CaptureError> {
        let Some(session) = self.session.as_mut() else {
            return Err(CaptureError::Unavailable("camera not open".into()));
        };

        match session.next_frame(self.frame_index) {
            Ok(frame) => {
                self.consecutive_failures = 0;
                self.frame_index += 1;
                Ok(frame)
            }
            Err(ReadFailure::EndOfStream) => {
                self.release();
                Err(CaptureError::Unavailable(
                    "device stopped delivering frames".into(),
                ))
            }
            Err(ReadFailure::Failed(reason)) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= MAX_CONSECUTIVE_READ_FAILURES {
                    let failures = self.consecutive_failures;
                    self.release();
                    Err(CaptureError::Unavailable(format!(
                        "{failures} consecutive read failures, last: {reason}"
                    )))
                } else {
                    Err(CaptureError::Transient(reason))
                }
            }
        }
    }

    fn release(&mut self) {
        if self.session.take().is_some() {
            log::info!("Camera {} released", self.device);
        }
        self.consecutive_failures = 0;
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.release();
    }
}

/// libavdevice input format for the current platform.
pub fn default_input_format() -> &'static str {
    #[cfg(target_os = "macos")]
    {
        "avfoundation"
    }
    #[cfg(target_os = "windows")]
    {
        "vfwcap"
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        "v4l2"
    }
}

enum ReadFailure {
    EndOfStream,
    Failed(String),
}

/// Everything that only exists while the device is open.
struct CameraSession {
    ictx: ffmpeg_next::format::context::Input,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    stream_index: usize,
    width: u32,
    height: u32,
}

impl CameraSession {
    fn open(
        device: &str,
        input_format: &str,
        width: u32,
        height: u32,
        fps: u32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;
        ffmpeg_next::device::register_all();

        let format = ffmpeg_next::device::input::video()
            .find(|f| f.name() == input_format)
            .ok_or_else(|| format!("ffmpeg was built without the '{input_format}' input device"))?;

        let mut options = ffmpeg_next::Dictionary::new();
        options.set("video_size", &format!("{width}x{height}"));
        options.set("framerate", &fps.to_string());

        let ictx = ffmpeg_next::format::open_with(
            device,
            &ffmpeg_next::format::format::Format::Input(format),
            options,
        )?
        .input();

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream on capture device")?;
        let stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let (width, height) = (decoder.width(), decoder.height());
        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        Ok(Self {
            ictx,
            decoder,
            scaler,
            stream_index,
            width,
            height,
        })
    }

    fn next_frame(&mut self, index: usize) -> Result<Frame, ReadFailure> {
        let failed = |e: ffmpeg_next::Error| ReadFailure::Failed(e.to_string());

        for _ in 0..MAX_PACKETS_PER_FRAME {
            let mut packet = ffmpeg_next::Packet::empty();
            match packet.read(&mut self.ictx) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => return Err(ReadFailure::EndOfStream),
                Err(e) => return Err(failed(e)),
            }
            if packet.stream() != self.stream_index {
                continue;
            }

            self.decoder.send_packet(&packet).map_err(failed)?;

            let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
                self.scaler.run(&decoded, &mut rgb_frame).map_err(failed)?;
                let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
                return Ok(Frame::new(pixels, self.width, self.height, 3, index));
            }
        }

        Err(ReadFailure::Failed("no frame decoded".into()))
    }
}

fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}
