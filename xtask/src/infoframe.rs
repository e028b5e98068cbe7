//! `cargo xtask infoframe`: what the driver would program for a mode.
//!
//! Runs the same descriptor and packing code as `setup`, without hardware,
//! so bring-up register dumps can be compared against it.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::Colorize;
use dw_hdmi_qp::audio::{compute_cts, compute_n};
use dw_hdmi_qp::infoframe::{header_word, pack_le32, PAYLOAD_COPY_START};
use dw_hdmi_qp::registers::{HDMI14_MAX_TMDSCLK, PKT_AVI_CONTENTS0, PKT_AVI_CONTENTS1};
use dw_hdmi_qp::vmode;
use platform::{ColorEncoding, DisplayMode, ModeFlags, OutputFormat, PictureAspect};

#[derive(Clone, Copy, ValueEnum)]
pub enum Encoding {
    Rgb,
    Yuv444,
    Yuv422,
    Yuv420,
}

impl From<Encoding> for ColorEncoding {
    fn from(e: Encoding) -> Self {
        match e {
            Encoding::Rgb => Self::Rgb,
            Encoding::Yuv444 => Self::Ycbcr444,
            Encoding::Yuv422 => Self::Ycbcr422,
            Encoding::Yuv420 => Self::Ycbcr420,
        }
    }
}

#[derive(Args)]
pub struct ModeArgs {
    /// Pixel clock in kHz
    #[arg(long, default_value_t = 148_500)]
    clock_khz: u32,
    /// Active width
    #[arg(long, default_value_t = 1920)]
    hdisplay: u16,
    /// Active height
    #[arg(long, default_value_t = 1080)]
    vdisplay: u16,
    /// CEA-861 video identification code
    #[arg(long, default_value_t = 16)]
    vic: u8,
    /// Link pixel encoding
    #[arg(long, value_enum, default_value_t = Encoding::Rgb)]
    encoding: Encoding,
    /// Bits per component
    #[arg(long, default_value_t = 8)]
    bpc: u8,
    /// Double-clocked mode (pixel repetition)
    #[arg(long)]
    double_clock: bool,
    /// Audio sample rate for the N/CTS line
    #[arg(long, default_value_t = 48_000)]
    audio_rate: u32,
}

impl ModeArgs {
    fn mode(&self) -> DisplayMode {
        DisplayMode {
            clock_khz: self.clock_khz,
            hdisplay: self.hdisplay,
            vdisplay: self.vdisplay,
            flags: ModeFlags(if self.double_clock { ModeFlags::DBLCLK } else { 0 }),
            vic: self.vic,
            picture_aspect: PictureAspect::Aspect16x9,
        }
    }

    fn output(&self) -> OutputFormat {
        OutputFormat {
            encoding: self.encoding.into(),
            bpc: self.bpc,
        }
    }
}

pub fn run(args: &ModeArgs) -> Result<()> {
    if !matches!(args.bpc, 8 | 10 | 12 | 16) {
        anyhow::bail!("unsupported bits per component {}", args.bpc);
    }

    let mode = args.mode();
    let data = vmode::prep_data(&mode, &args.output());
    let mut frame = vmode::avi_infoframe(&data, &mode);
    let buf = frame.pack_for_controller();

    let tmds = data.video_mode.tmds_clock_hz;
    let scrambled = tmds > HDMI14_MAX_TMDSCLK;

    println!();
    println!(
        "{}",
        format!(
            "{}x{} VIC {} @ {} kHz",
            mode.hdisplay, mode.vdisplay, mode.vic, mode.clock_khz
        )
        .cyan()
        .bold()
    );
    println!("  TMDS character rate  {tmds} Hz");
    println!(
        "  scrambling           {}",
        if scrambled { "on (SCDC 1/40 ratio)".yellow() } else { "off".normal() }
    );
    println!("  pixel repetition     {}", data.pix_repet_factor);
    println!("  RGB limited range    {}", data.rgb_limited_range);

    let n = compute_n(args.audio_rate);
    println!(
        "  audio N/CTS          {n} / {}",
        compute_cts(n, args.audio_rate, tmds)
    );

    println!();
    println!("{}", format!("AVI infoframe v{}", frame.version).cyan());
    println!(
        "  {:#06x} <- {:#010x}",
        PKT_AVI_CONTENTS0,
        header_word(frame.version, frame.length)
    );

    let count = usize::from(frame.length)
        .checked_add(1)
        .context("infoframe length overflow")?;
    for (offset, word) in (PKT_AVI_CONTENTS1..)
        .step_by(4)
        .zip(pack_le32(&buf, PAYLOAD_COPY_START, count))
    {
        println!("  {offset:#06x} <- {word:#010x}");
    }
    println!();

    Ok(())
}
