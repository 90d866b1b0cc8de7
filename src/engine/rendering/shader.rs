use log::{ debug, warn };

use crate::engine::error::{ Error, Result };
use crate::engine::gpu::{ describe_error, Gpu, ProgramId, ShaderId, ShaderStage, NO_ERROR };

/// Compiles one stage. The shader object is deleted again when compilation fails.
pub fn compile_shader(gpu: &dyn Gpu, stage: ShaderStage, source: &str) -> Result<ShaderId> {
    let shader = gpu.create_shader(stage).map_err(Error::resource("shader"))?;
    gpu.shader_source(shader, source);

    if !gpu.compile_shader(shader) {
        let log = gpu.shader_info_log(shader);
        gpu.delete_shader(shader);
        return Err(Error::ShaderCompile { stage, log });
    }
    Ok(shader)
}

/// Links and validates `shaders` into a program.
///
/// The shaders stay owned by the caller; they are detached after a successful
/// link so they can be deleted right away.
pub fn link_program(gpu: &dyn Gpu, shaders: &[ShaderId]) -> Result<ProgramId> {
    let program = gpu.create_program().map_err(Error::resource("program"))?;
    for &shader in shaders {
        gpu.attach_shader(program, shader);
    }

    let linked = gpu.link_program(program);
    let valid = linked && gpu.validate_program(program);
    if !valid {
        let log = gpu.program_info_log(program);
        gpu.delete_program(program);
        return Err(Error::ShaderLink(log));
    }

    for &shader in shaders {
        gpu.detach_shader(program, shader);
    }
    debug!("linked program {:?} from {} shaders", program, shaders.len());
    Ok(program)
}

/// Surfaces a pending GL error.
///
/// Debug builds turn it into [`Error::DriverState`]; release builds log it and carry on.
pub fn checkpoint(gpu: &dyn Gpu, label: &str) -> Result<()> {
    let code = gpu.get_error();
    if code == NO_ERROR {
        return Ok(());
    }

    let description = describe_error(code);
    if cfg!(debug_assertions) {
        Err(Error::DriverState { label: label.to_string(), description })
    } else {
        warn!("GL error: {}, at {}", description, label);
        Ok(())
    }
}
