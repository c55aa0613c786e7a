use std::error::Error;
use std::fs;
use std::io;
use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::learner::{Learner, LearnerTrait};
use crate::model_instance::ModelInstance;
use crate::optimizer::FtrlData;

const MODEL_HEADER_MAGIC_STRING: &[u8; 4] = b"FTRL";
const MODEL_HEADER_VERSION: u32 = 1;

impl ModelInstance {
    pub fn save_to_buf(&self, output_bufwriter: &mut dyn io::Write) -> Result<(), Box<dyn Error>> {
        let serialized = serde_json::to_vec_pretty(&self)?;
        output_bufwriter.write_u64::<LittleEndian>(serialized.len() as u64)?;
        output_bufwriter.write_all(&serialized)?;
        Ok(())
    }

    pub fn new_from_buf(input_bufreader: &mut dyn io::Read) -> Result<ModelInstance, Box<dyn Error>> {
        let len = input_bufreader.read_u64::<LittleEndian>()?;
        let mi: ModelInstance = serde_json::from_reader(input_bufreader.take(len))?;
        mi.validate()?;
        Ok(mi)
    }
}

fn write_model_header(output_bufwriter: &mut dyn io::Write) -> Result<(), Box<dyn Error>> {
    output_bufwriter.write_all(MODEL_HEADER_MAGIC_STRING)?;
    output_bufwriter.write_u32::<LittleEndian>(MODEL_HEADER_VERSION)?;
    Ok(())
}

fn verify_header(input_bufreader: &mut dyn io::Read) -> Result<(), Box<dyn Error>> {
    let mut magic_string: [u8; 4] = [0; 4];
    input_bufreader.read_exact(&mut magic_string)?;
    if &magic_string != MODEL_HEADER_MAGIC_STRING {
        return Err("Model file does not begin with magic bytes FTRL")?;
    }

    let version = input_bufreader.read_u32::<LittleEndian>()?;
    if MODEL_HEADER_VERSION != version {
        return Err(format!(
            "Model file version of this binary: {}, version of the model file: {}",
            MODEL_HEADER_VERSION, version
        ))?;
    }
    Ok(())
}

pub fn save_learner_to_buf(
    output_bufwriter: &mut dyn io::Write,
    learner: &Learner,
) -> Result<(), Box<dyn Error>> {
    write_model_header(output_bufwriter)?;
    learner.model_instance().save_to_buf(output_bufwriter)?;
    // Per slot: weight, n, z
    for entry in learner.core().store().entries() {
        output_bufwriter.write_f64::<LittleEndian>(entry.weight)?;
        output_bufwriter.write_f64::<LittleEndian>(entry.optimizer_data.n)?;
        output_bufwriter.write_f64::<LittleEndian>(entry.optimizer_data.z)?;
    }
    Ok(())
}

pub fn save_learner_to_filename(filename: &str, learner: &Learner) -> Result<(), Box<dyn Error>> {
    let mut output_bufwriter = io::BufWriter::new(fs::File::create(filename)?);
    save_learner_to_buf(&mut output_bufwriter, learner)?;
    output_bufwriter.flush()?;
    log::info!("Saved model to {}", filename);
    Ok(())
}

// The stored weight is implied by the accumulators and gets recomputed on restore
fn read_slot(input_bufreader: &mut dyn io::Read) -> io::Result<FtrlData> {
    let _weight = input_bufreader.read_f64::<LittleEndian>()?;
    let n = input_bufreader.read_f64::<LittleEndian>()?;
    let z = input_bufreader.read_f64::<LittleEndian>()?;
    Ok(FtrlData { n, z })
}

pub fn new_learner_from_buf(input_bufreader: &mut dyn io::Read) -> Result<Learner, Box<dyn Error>> {
    verify_header(input_bufreader)?;
    let mi = ModelInstance::new_from_buf(input_bufreader)?;

    let mut accumulators = Vec::with_capacity(mi.hash_space);
    for slot in 0..mi.hash_space {
        match read_slot(input_bufreader) {
            Ok(data) => accumulators.push(data),
            Err(e) => {
                return Err(format!(
                    "Model file truncated at slot {} of {}: {}",
                    slot, mi.hash_space, e
                ))?
            }
        }
    }
    let mut trailing = [0u8; 1];
    if input_bufreader.read(&mut trailing)? != 0 {
        return Err(format!(
            "Model file has data after the {} declared slots",
            mi.hash_space
        ))?;
    }

    let mut learner = Learner::new(&mi);
    learner.core_mut().restore_accumulators(&accumulators)?;
    Ok(learner)
}

pub fn new_learner_from_filename(filename: &str) -> Result<Learner, Box<dyn Error>> {
    let mut input_bufreader = io::BufReader::new(fs::File::open(filename)?);
    let learner = new_learner_from_buf(&mut input_bufreader)?;
    log::info!("Loaded model from {}", filename);
    Ok(learner)
}
